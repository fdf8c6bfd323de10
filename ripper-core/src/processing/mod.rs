pub mod elapsed;
pub mod wav_format;
