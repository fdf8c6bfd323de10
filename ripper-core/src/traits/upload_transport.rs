use std::path::PathBuf;

use crate::models::error::RipError;

/// Everything needed to deliver one staged track.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadRequest {
    pub destination: String,
    pub session_id: String,
    pub system_id: String,
    pub file_name: String,
    pub file_size: u64,
    pub file_path: PathBuf,
}

impl UploadRequest {
    /// Query parameters expected by the collection endpoint, in order.
    pub fn query_pairs(&self) -> Vec<(&'static str, String)> {
        vec![
            ("sessionId", self.session_id.clone()),
            ("systemId", self.system_id.clone()),
            ("fileSize", self.file_size.to_string()),
            ("fileName", self.file_name.clone()),
        ]
    }
}

/// Delivers a staged track file to the remote collection point.
///
/// One request per track; the body is the raw file. Any response other than
/// a 200-equivalent must be reported as `RipError::UploadStatus`.
pub trait UploadTransport: Send + Sync {
    fn upload(&self, request: &UploadRequest) -> Result<(), RipError>;
}
