use thiserror::Error;

use super::state::RipState;

/// Failure causes inside a state action.
///
/// None of these escape `RipEngine::tick()`; they are logged and turned
/// into a transition to `Error` (or a retry, for `DiscRead`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RipError {
    #[error("disc read failed: {0}")]
    DiscRead(String),

    #[error("no disc in drive")]
    DiscAbsent,

    #[error("extraction failed: {0}")]
    Extraction(String),

    #[error("aborted")]
    Aborted,

    #[error("storage error: {0}")]
    Storage(String),

    #[error("upload rejected with status {0}")]
    UploadStatus(u16),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("eject failed: {0}")]
    Eject(String),

    #[error("configuration failed: {0}")]
    Configuration(String),

    #[error("worker failed: {0}")]
    Worker(String),
}

/// Errors returned from the command surface.
///
/// A rejected command leaves the engine untouched.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CommandError {
    #[error("{command} not accepted in state {state:?}")]
    Rejected {
        command: &'static str,
        state: RipState,
    },

    #[error("invalid file name: {0:?}")]
    InvalidFileName(String),
}
