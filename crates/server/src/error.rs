//! HTTP rendering of cairn errors.
//!
//! Failures are answered as `{"error": {"code", "message"}}` with a status
//! derived from the error kind. A rejected note submission is answered with
//! the submission and its field errors so the editor can be re-rendered.
//! A page that fails to render is an internal error.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use cairn_core::Error;
use serde_json::json;

/// Error returned by HTTP handlers.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error(transparent)]
    Core(#[from] Error),

    #[error("page rendering failed: {0}")]
    Render(#[from] minijinja::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        let ApiError::Core(err) = self else { return StatusCode::INTERNAL_SERVER_ERROR };
        match err {
            Error::InvalidInput(_) | Error::InvalidBackend(_) | Error::Validation(_) => StatusCode::BAD_REQUEST,
            Error::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            Error::Forbidden(_) => StatusCode::FORBIDDEN,
            Error::NotFound(_) | Error::UnknownInstance(_) => StatusCode::NOT_FOUND,
            Error::InstanceUnreachable(_) => StatusCode::BAD_GATEWAY,
            Error::Database(_) | Error::MigrationFailed(_) | Error::Serialization(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let err = match self {
            ApiError::Core(err) => err,
            ApiError::Render(err) => {
                tracing::error!(error = %err, "page rendering failed");
                let body = json!({"error": {"code": "RENDER_ERROR", "message": "internal error"}});
                return (status, Json(body)).into_response();
            }
        };
        let body = match &err {
            Error::Validation(rejected) => json!({
                "status": "error",
                "submission": rejected.submission,
                "errors": rejected.errors,
            }),
            err if status == StatusCode::INTERNAL_SERVER_ERROR => {
                tracing::error!(error = %err, "request failed");
                json!({"error": {"code": err.code(), "message": "internal error"}})
            }
            err => {
                tracing::debug!(error = %err, status = status.as_u16(), "request rejected");
                json!({"error": {"code": err.code(), "message": err.message()}})
            }
        };
        (status, Json(body)).into_response()
    }
}
