//! # ripper-host
//!
//! Host process pieces for the remote ripper.
//!
//! Provides:
//! - `Args` / `HostError`: CLI and environment configuration
//! - `HttpUploadTransport`: track delivery over HTTP
//! - `StubDisc`: simulated drive for machines without optical hardware
//! - `LogStatusSink`: status publication through the log
//! - `Heartbeat`: periodic caller of `RipEngine::tick`
//! - `api`: HTTP control surface
//!
//! ## Usage
//! ```ignore
//! use ripper_core::RipEngine;
//! use ripper_host::{Heartbeat, HttpUploadTransport, StubDisc};
//!
//! let engine = Arc::new(RipEngine::new(context, StubDisc::new(10), transport)?);
//! let ticker = Arc::clone(&engine);
//! let heartbeat = Heartbeat::start(Duration::from_secs(1), move || ticker.tick())?;
//! ```

pub mod api;
pub mod config;
pub mod heartbeat;
pub mod http_upload;
pub mod status_log;
pub mod stub_disc;

pub use config::{Args, HostError};
pub use heartbeat::Heartbeat;
pub use http_upload::HttpUploadTransport;
pub use status_log::LogStatusSink;
pub use stub_disc::StubDisc;

/// Name this service reports at startup.
pub const SERVICE_NAME: &str = "RemoteRipper";
