pub mod audio_format;
pub mod error;
pub mod rip_status;
pub mod session;
pub mod staged_track;
pub mod state;
pub mod toc;
