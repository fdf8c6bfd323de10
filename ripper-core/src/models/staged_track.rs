use std::path::PathBuf;

use super::error::CommandError;

/// Extension of every staged track file.
pub const TRACK_EXTENSION: &str = "wav";

/// Pending (track, output name) recorded by a rip command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackIntent {
    pub track: u32,
    pub output_name: String,
}

impl TrackIntent {
    pub fn new(track: u32, output_name: &str) -> Result<Self, CommandError> {
        if output_name.trim().is_empty()
            || output_name.contains(['/', '\\'])
            || output_name == "."
            || output_name == ".."
        {
            return Err(CommandError::InvalidFileName(output_name.to_string()));
        }
        Ok(Self {
            track,
            output_name: output_name.to_string(),
        })
    }

    /// File name of the extracted track, extension included.
    pub fn file_name(&self) -> String {
        format!("{}.{}", self.output_name, TRACK_EXTENSION)
    }
}

/// A track extracted into the staging directory, awaiting upload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StagedTrack {
    pub track: u32,
    pub file_name: String,
    pub file_path: PathBuf,
    pub size_bytes: u64,
    /// SHA-256 of the file, hex encoded.
    pub checksum: String,
}
