//! Unified error types for cairn.
//!
//! Every variant carries a stable code prefix so that callers on either
//! surface (HTTP or MCP) can match on it.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

use crate::notes::Rejected;

/// Unified error types for cairn.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., limit out of range).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// Unrecognized cache backend tag.
    #[error("INVALID_BACKEND: unknown cache type `{0}`")]
    InvalidBackend(String),

    /// The addressed instance is not in the directory.
    #[error("UNKNOWN_INSTANCE: {0}")]
    UnknownInstance(String),

    /// The addressed instance is known but could not be reached.
    #[error("INSTANCE_UNREACHABLE: {0}")]
    InstanceUnreachable(String),

    /// No record visible to the caller.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// A submission failed field validation.
    #[error("VALIDATION_FAILED: {}", .0.errors)]
    Validation(Box<Rejected>),

    /// The request carried no usable credentials.
    #[error("UNAUTHORIZED: {0}")]
    Unauthorized(String),

    /// The caller is known but lacks the required role.
    #[error("FORBIDDEN: {0}")]
    Forbidden(String),

    /// Database operation failed.
    #[error("STORE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("STORE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// A stored value could not be encoded or decoded.
    #[error("STORE_ERROR: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Stable code prefixed to the display form.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::InvalidBackend(_) => "INVALID_BACKEND",
            Error::UnknownInstance(_) => "UNKNOWN_INSTANCE",
            Error::InstanceUnreachable(_) => "INSTANCE_UNREACHABLE",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Validation(_) => "VALIDATION_FAILED",
            Error::Unauthorized(_) => "UNAUTHORIZED",
            Error::Forbidden(_) => "FORBIDDEN",
            Error::Database(_) | Error::MigrationFailed(_) | Error::Serialization(_) => "STORE_ERROR",
        }
    }

    /// Display form without the code prefix.
    pub fn message(&self) -> String {
        let full = self.to_string();
        match full.strip_prefix(self.code()).and_then(|rest| rest.strip_prefix(": ")) {
            Some(rest) => rest.to_string(),
            None => full,
        }
    }

    /// Whether the error was caused by the caller rather than by the system.
    pub fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Error::Database(_) | Error::MigrationFailed(_) | Error::Serialization(_) | Error::InstanceUnreachable(_)
        )
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let (code, message, data) = match &err {
            Error::InvalidInput(msg) => (-32602, msg.clone(), None),
            Error::InvalidBackend(_) => (-32602, err.to_string(), None),
            Error::Validation(rejected) => {
                (-32602, "submission failed validation".to_string(), serde_json::to_value(rejected.as_ref()).ok())
            }
            Error::NotFound(msg) => (-32001, msg.clone(), None),
            Error::UnknownInstance(msg) => (-32003, msg.clone(), None),
            Error::InstanceUnreachable(msg) => (-32004, msg.clone(), None),
            Error::Unauthorized(msg) => (-32005, msg.clone(), None),
            Error::Forbidden(msg) => (-32006, msg.clone(), None),
            Error::Database(e) => (-32002, e.to_string(), None),
            Error::MigrationFailed(msg) => (-32002, msg.clone(), None),
            Error::Serialization(e) => (-32002, e.to_string(), None),
        };

        McpError { code: ErrorCode(code), message: message.into(), data }
    }
}
