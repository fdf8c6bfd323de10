use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use ripper_core::{RipError, SessionContext};
use thiserror::Error;

/// Errors that stop the host process.
#[derive(Debug, Error)]
pub enum HostError {
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error(transparent)]
    Rip(#[from] RipError),

    #[error("http client: {0}")]
    Http(#[from] reqwest::Error),

    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

/// Command-line arguments for the remote ripper.
#[derive(Parser, Debug, Clone)]
#[command(name = "remote-ripper")]
#[command(about = "Remotely controlled CD ripper that uploads tracks to a collection server")]
#[command(version)]
pub struct Args {
    /// Identifier of this ripping station, sent with every upload
    #[arg(long, env = "RIPPER_SYSTEM_ID")]
    pub system_id: String,

    /// Session identifier sent with every upload (random if omitted)
    #[arg(long, env = "RIPPER_SESSION_ID")]
    pub session_id: Option<String>,

    /// Collection endpoint receiving ripped tracks
    #[arg(long, env = "RIPPER_UPLOAD_ADDRESS")]
    pub upload_address: String,

    /// Scratch directory for the track being ripped
    #[arg(long, env = "RIPPER_STAGING_DIR", default_value = "staging")]
    pub staging_dir: PathBuf,

    /// Address the control API listens on
    #[arg(long, env = "RIPPER_LISTEN", default_value = "127.0.0.1:8590")]
    pub listen: SocketAddr,

    /// Heartbeat period in milliseconds
    #[arg(long, env = "RIPPER_HEARTBEAT_MS", default_value = "1000")]
    pub heartbeat_ms: u64,

    /// Use a simulated drive with this many tracks instead of real hardware
    #[arg(long, env = "RIPPER_STUB_TRACKS", default_value = "10")]
    pub stub_tracks: u32,

    /// Upload request timeout in seconds
    #[arg(long, env = "RIPPER_UPLOAD_TIMEOUT_SECS", default_value = "300")]
    pub upload_timeout_secs: u64,
}

impl Args {
    /// Build the per-session context, generating a session id when none was given.
    pub fn session_context(&self) -> Result<SessionContext, HostError> {
        let session_id = self
            .session_id
            .clone()
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

        let context = SessionContext {
            system_id: self.system_id.clone(),
            session_id,
            upload_address: self.upload_address.clone(),
            staging_dir: self.staging_dir.clone(),
        };
        context.validate().map_err(HostError::Config)?;
        Ok(context)
    }

    pub fn heartbeat_interval(&self) -> Result<Duration, HostError> {
        if self.heartbeat_ms == 0 {
            return Err(HostError::Config("heartbeat period must be positive".into()));
        }
        Ok(Duration::from_millis(self.heartbeat_ms))
    }

    pub fn upload_timeout(&self) -> Duration {
        Duration::from_secs(self.upload_timeout_secs)
    }
}
