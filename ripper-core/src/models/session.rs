use std::path::PathBuf;

/// Identifiers fixed for the engine's lifetime.
///
/// Supplied by the host at startup; the host refuses to start when
/// `validate()` fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    /// Identity of this ripper as registered with the remote controller.
    pub system_id: String,

    /// Identity of the login session, echoed on every upload.
    pub session_id: String,

    /// Absolute http(s) address uploads are posted to.
    pub upload_address: String,

    /// Local scratch directory for extracted tracks. Exclusively owned by the engine.
    pub staging_dir: PathBuf,
}

impl SessionContext {
    pub fn validate(&self) -> Result<(), String> {
        if self.system_id.trim().is_empty() {
            return Err("system id must not be empty".into());
        }
        if self.session_id.trim().is_empty() {
            return Err("session id must not be empty".into());
        }
        if !(self.upload_address.starts_with("http://") || self.upload_address.starts_with("https://")) {
            return Err(format!("unsupported upload address: {:?}", self.upload_address));
        }
        if self.staging_dir.as_os_str().is_empty() {
            return Err("staging directory must be set".into());
        }
        Ok(())
    }
}
