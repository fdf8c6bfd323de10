use std::io::Read;
use std::sync::Arc;

use crate::models::audio_format::PcmFormat;
use crate::models::error::RipError;
use crate::models::toc::TableOfContents;

/// Progress report from an in-progress extraction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RipProgress {
    /// Percentage of the track extracted so far, 0–100.
    Percent(u8),
    /// The drive hit an unrecoverable read error; the extraction is failed.
    Error(String),
}

/// Callback invoked by the device as an extraction advances.
///
/// Fires on whatever thread is reading the track stream.
pub type ProgressCallback = Arc<dyn Fn(RipProgress) + Send + Sync + 'static>;

/// Raw PCM for one track, pulled by the engine until EOF.
pub struct TrackStream {
    pub format: PcmFormat,
    pub reader: Box<dyn Read + Send>,
}

impl TrackStream {
    pub fn new(format: PcmFormat, reader: impl Read + Send + 'static) -> Self {
        Self {
            format,
            reader: Box::new(reader),
        }
    }
}

/// Interface to the optical drive.
///
/// How sectors are read and error-corrected is the implementation's concern.
/// The engine owns the device exclusively and never calls it from two
/// threads at once.
pub trait DiscDevice: Send {
    /// Read the table of contents of the inserted disc.
    fn table_of_contents(&mut self) -> Result<TableOfContents, RipError>;

    /// Start extracting `track`. Progress is reported through `progress`
    /// while the returned stream is read.
    fn read_track(&mut self, track: u32, progress: ProgressCallback) -> Result<TrackStream, RipError>;

    /// Whether a disc is still in the drive.
    fn is_disc_present(&mut self) -> bool;

    /// Eject the disc.
    fn eject(&mut self) -> Result<(), RipError>;

    /// Abandon an extraction in progress. Best-effort.
    fn cancel(&mut self);
}
