use std::fs;
use std::path::{Path, PathBuf};

use crate::models::error::RipError;

/// Flat scratch directory holding the in-flight or most recently extracted track.
///
/// Exclusively owned by one engine. Emptied (never removed) on every
/// disc-cycle reset and before each new extraction.
#[derive(Debug, Clone)]
pub struct StagingDirectory {
    path: PathBuf,
}

impl StagingDirectory {
    /// Create the directory (and parents) if needed.
    pub fn create(path: impl Into<PathBuf>) -> Result<Self, RipError> {
        let path = path.into();
        fs::create_dir_all(&path).map_err(|e| {
            RipError::Storage(format!("failed to create staging directory {}: {}", path.display(), e))
        })?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Path a staged file with `file_name` would occupy.
    pub fn file_path(&self, file_name: &str) -> PathBuf {
        self.path.join(file_name)
    }

    /// Remove every entry in the directory, keeping the directory itself.
    ///
    /// Keeps going past individual failures and reports the first one.
    pub fn clear(&self) -> Result<(), RipError> {
        let entries = match fs::read_dir(&self.path) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return fs::create_dir_all(&self.path)
                    .map_err(|e| RipError::Storage(format!("failed to recreate staging directory: {}", e)));
            }
            Err(e) => return Err(RipError::Storage(format!("failed to list staging directory: {}", e))),
        };

        let mut first_error = None;
        for entry in entries.flatten() {
            let path = entry.path();
            let result = if path.is_dir() {
                fs::remove_dir_all(&path)
            } else {
                fs::remove_file(&path)
            };
            if let Err(e) = result {
                log::warn!("Failed to remove staged entry {}: {}", path.display(), e);
                first_error.get_or_insert(RipError::Storage(format!(
                    "failed to remove {}: {}",
                    path.display(),
                    e
                )));
            }
        }

        match first_error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Names of the entries currently staged, sorted.
    pub fn entries(&self) -> Result<Vec<String>, RipError> {
        let mut names: Vec<String> = fs::read_dir(&self.path)
            .map_err(|e| RipError::Storage(format!("failed to list staging directory: {}", e)))?
            .flatten()
            .map(|entry| entry.file_name().to_string_lossy().to_string())
            .collect();
        names.sort();
        Ok(names)
    }

    pub fn is_empty(&self) -> bool {
        self.entries().map(|e| e.is_empty()).unwrap_or(true)
    }
}
