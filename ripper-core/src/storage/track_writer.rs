use std::fs::{self, File};
use std::io::{self, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::audio_format::PcmFormat;
use crate::models::error::RipError;
use crate::processing::wav_format;

/// Streaming WAV writer for one extracted track.
///
/// ## File Format
///
/// ```text
/// [44-byte WAV header]
/// [raw PCM data as delivered by the disc device...]
/// ```
///
/// The header is written with a zero data size on `open` and rewritten
/// with the final sizes on `close`.
pub struct TrackFileWriter {
    file_path: PathBuf,
    format: PcmFormat,
    file: Option<BufWriter<File>>,
    data_bytes_written: u64,
}

impl TrackFileWriter {
    pub fn new(file_path: PathBuf) -> Self {
        Self {
            file_path,
            format: PcmFormat::CD_AUDIO,
            file: None,
            data_bytes_written: 0,
        }
    }

    /// Create the file and write the initial 44-byte WAV header.
    pub fn open(&mut self, format: PcmFormat) -> Result<(), RipError> {
        if self.file.is_some() {
            return Ok(());
        }

        if let Some(parent) = self.file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| RipError::Storage(format!("failed to create directory: {}", e)))?;
        }

        let file = File::create(&self.file_path)
            .map_err(|e| RipError::Storage(format!("failed to create file: {}", e)))?;
        let mut file = BufWriter::new(file);
        file.write_all(&wav_format::generate_wav_header(format, 0))
            .map_err(|e| RipError::Storage(format!("failed to write header: {}", e)))?;

        self.format = format;
        self.file = Some(file);
        Ok(())
    }

    /// Append raw PCM data.
    pub fn write(&mut self, data: &[u8]) -> Result<(), RipError> {
        let file = self
            .file
            .as_mut()
            .ok_or_else(|| RipError::Storage("file is not open for writing".into()))?;
        file.write_all(data)
            .map_err(|e| RipError::Storage(format!("write failed: {}", e)))?;
        self.data_bytes_written += data.len() as u64;
        Ok(())
    }

    /// Finalize the file: patch the WAV header sizes, compute the SHA-256 checksum.
    pub fn close(&mut self) -> Result<String, RipError> {
        let mut file = self
            .file
            .take()
            .ok_or_else(|| RipError::Storage("file is not open".into()))?;

        let header = wav_format::generate_wav_header(self.format, self.data_bytes_written);
        file.seek(SeekFrom::Start(0))
            .and_then(|_| file.write_all(&header))
            .and_then(|_| file.flush())
            .map_err(|e| RipError::Storage(format!("failed to finalize header: {}", e)))?;
        drop(file);

        sha256_file(&self.file_path)
    }

    /// PCM bytes written so far (header excluded).
    pub fn data_bytes_written(&self) -> u64 {
        self.data_bytes_written
    }

    /// Size of the finished file on disk.
    pub fn file_size(&self) -> u64 {
        self.data_bytes_written + wav_format::WAV_HEADER_SIZE as u64
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }
}

/// Compute SHA-256 hex digest of a file.
fn sha256_file(path: &Path) -> Result<String, RipError> {
    let mut file =
        File::open(path).map_err(|e| RipError::Storage(format!("failed to read file for checksum: {}", e)))?;
    let mut hasher = Sha256::new();
    io::copy(&mut file, &mut hasher)
        .map_err(|e| RipError::Storage(format!("failed to read file for checksum: {}", e)))?;
    Ok(hex_encode(&hasher.finalize()))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
