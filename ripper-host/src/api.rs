//! HTTP control surface.
//!
//! Thin mapping from requests onto [`RipController`] commands. Handlers only
//! record intent; acceptance means the next heartbeat will act on it.
//!
//! | Method | Path        | Command            |
//! |--------|-------------|--------------------|
//! | GET    | `/status`   | `status()`         |
//! | POST   | `/rip`      | `request_rip()`    |
//! | POST   | `/upload`   | `request_upload()` |
//! | POST   | `/finalise` | `request_finalise()` |
//! | POST   | `/cancel`   | `cancel()`         |

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use ripper_core::{CommandError, RipController, RipStatus};
use serde::{Deserialize, Serialize};

pub type SharedController = Arc<dyn RipController>;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RipRequest {
    pub track_no: u32,
    pub file_name: String,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

/// A command the engine refused.
pub struct ApiError(CommandError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            CommandError::Rejected { .. } => StatusCode::CONFLICT,
            CommandError::InvalidFileName(_) => StatusCode::BAD_REQUEST,
        };
        let body = ErrorBody {
            error: self.0.to_string(),
        };
        (status, Json(body)).into_response()
    }
}

impl From<CommandError> for ApiError {
    fn from(e: CommandError) -> Self {
        Self(e)
    }
}

pub fn router(controller: SharedController) -> Router {
    Router::new()
        .route("/status", get(status))
        .route("/rip", post(rip))
        .route("/upload", post(upload))
        .route("/finalise", post(finalise))
        .route("/cancel", post(cancel))
        .with_state(controller)
}

async fn status(State(controller): State<SharedController>) -> Json<RipStatus> {
    Json(controller.status())
}

async fn rip(
    State(controller): State<SharedController>,
    Json(request): Json<RipRequest>,
) -> Result<StatusCode, ApiError> {
    controller.request_rip(request.track_no, &request.file_name)?;
    Ok(StatusCode::ACCEPTED)
}

async fn upload(State(controller): State<SharedController>) -> Result<StatusCode, ApiError> {
    controller.request_upload()?;
    Ok(StatusCode::ACCEPTED)
}

async fn finalise(State(controller): State<SharedController>) -> Result<StatusCode, ApiError> {
    controller.request_finalise()?;
    Ok(StatusCode::ACCEPTED)
}

async fn cancel(State(controller): State<SharedController>) -> StatusCode {
    controller.cancel();
    StatusCode::ACCEPTED
}
