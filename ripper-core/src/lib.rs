//! # ripper-core
//!
//! Platform-agnostic core of the remote disc ripper.
//!
//! Provides the rip orchestration engine, the published status model, the
//! staging directory lifecycle and WAV track output. Hosts plug a disc drive,
//! an upload transport and a status sink into the generic `RipEngine` and
//! drive it with a periodic `tick()`.
//!
//! ## Architecture
//!
//! ```text
//! ripper-core (this crate)
//! ├── traits/       ← DiscDevice, UploadTransport, StatusSink, RipController
//! ├── models/       ← RipState, RipStatus, TableOfContents, SessionContext, RipError, etc.
//! ├── processing/   ← WAV header generation, elapsed-time formatting
//! ├── session/      ← RipEngine (state machine) and background jobs
//! └── storage/      ← StagingDirectory, TrackFileWriter
//! ```

pub mod models;
pub mod processing;
pub mod session;
pub mod storage;
pub mod traits;

#[cfg(test)]
pub(crate) mod test_support;

// Re-export key types at crate root for convenience.
pub use models::audio_format::PcmFormat;
pub use models::error::{CommandError, RipError};
pub use models::rip_status::RipStatus;
pub use models::session::SessionContext;
pub use models::staged_track::{StagedTrack, TrackIntent};
pub use models::state::{RipEvent, RipState};
pub use models::toc::{TableOfContents, TrackEntry};
pub use session::engine::RipEngine;
pub use storage::staging::StagingDirectory;
pub use storage::track_writer::TrackFileWriter;
pub use traits::disc_device::{DiscDevice, ProgressCallback, RipProgress, TrackStream};
pub use traits::rip_controller::RipController;
pub use traits::status_sink::StatusSink;
pub use traits::upload_transport::{UploadRequest, UploadTransport};
