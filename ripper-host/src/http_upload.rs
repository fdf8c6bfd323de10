//! HTTP delivery of staged tracks to the collection endpoint.

use std::fs::File;
use std::time::Duration;

use reqwest::blocking::Client;
use reqwest::StatusCode;
use ripper_core::{RipError, UploadRequest, UploadTransport};

/// POSTs each track as the raw request body, with the session metadata in
/// the query string. Only `200 OK` counts as delivered.
pub struct HttpUploadTransport {
    client: Client,
}

impl HttpUploadTransport {
    /// Must be called outside any async runtime: the blocking client owns one.
    pub fn new(timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = Client::builder()
            .user_agent(concat!("remote-ripper/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }
}

impl UploadTransport for HttpUploadTransport {
    fn upload(&self, request: &UploadRequest) -> Result<(), RipError> {
        let file = File::open(&request.file_path).map_err(|e| {
            RipError::Storage(format!("failed to open {}: {}", request.file_path.display(), e))
        })?;

        log::debug!("POST {} ({} bytes)", request.destination, request.file_size);
        let response = self
            .client
            .post(&request.destination)
            .query(&request.query_pairs())
            .header(reqwest::header::CONTENT_TYPE, "audio/wav")
            .body(file)
            .send()
            .map_err(|e| RipError::Transport(e.to_string()))?;

        let status = response.status();
        if status != StatusCode::OK {
            log::warn!("Upload of {} rejected: {}", request.file_name, status);
            return Err(RipError::UploadStatus(status.as_u16()));
        }

        log::info!("Uploaded {} to {}", request.file_name, request.destination);
        Ok(())
    }
}
