//! Peer instance client error types.

use std::sync::Arc;

use serde::Deserialize;

/// Errors from calls to a peer instance.
#[derive(Debug, thiserror::Error)]
pub enum ClientError {
    /// The peer URL could not be built.
    #[error("invalid url: {0}")]
    InvalidUrl(String),

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),

    /// The peer answered with an error status.
    #[error("remote error {status}: {message}")]
    Remote { status: u16, code: Option<String>, message: String },

    /// Response parse error.
    #[error("parse error: {0}")]
    Parse(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { ClientError::Timeout } else { ClientError::Network(Arc::new(err)) }
    }
}

/// Error body served by cairn's HTTP surface.
#[derive(Debug, Deserialize)]
pub(crate) struct RemoteErrorBody {
    pub error: RemoteErrorDetail,
}

#[derive(Debug, Deserialize)]
pub(crate) struct RemoteErrorDetail {
    pub code: String,
    pub message: String,
}

impl ClientError {
    /// Build a `Remote` error from a status and raw body.
    pub(crate) fn remote(status: u16, body: &[u8]) -> Self {
        match serde_json::from_slice::<RemoteErrorBody>(body) {
            Ok(parsed) => ClientError::Remote { status, code: Some(parsed.error.code), message: parsed.error.message },
            Err(_) => ClientError::Remote { status, code: None, message: String::from_utf8_lossy(body).into_owned() },
        }
    }
}

impl From<ClientError> for cairn_core::Error {
    fn from(err: ClientError) -> Self {
        use cairn_core::Error;

        match err {
            ClientError::Remote { status: 400, code, message } => match code.as_deref() {
                Some("INVALID_BACKEND") => Error::InvalidBackend(message),
                _ => Error::InvalidInput(message),
            },
            ClientError::Remote { status: 401, message, .. } => Error::Unauthorized(message),
            ClientError::Remote { status: 403, message, .. } => Error::Forbidden(message),
            ClientError::Remote { status: 404, code, message } => match code.as_deref() {
                Some("UNKNOWN_INSTANCE") => Error::UnknownInstance(message),
                _ => Error::NotFound(message),
            },
            other => Error::InstanceUnreachable(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ClientError::Timeout;
        assert!(err.to_string().contains("timeout"));

        let err = ClientError::Remote { status: 500, code: None, message: "boom".into() };
        assert!(err.to_string().contains("500"));
    }

    #[test]
    fn test_remote_parses_error_body() {
        let body = br#"{"error":{"code":"INVALID_BACKEND","message":"unknown cache type `x`"}}"#;
        let err = ClientError::remote(400, body);
        assert!(matches!(&err, ClientError::Remote { code: Some(code), .. } if code == "INVALID_BACKEND"));
        assert!(matches!(cairn_core::Error::from(err), cairn_core::Error::InvalidBackend(_)));
    }

    #[test]
    fn test_remote_falls_back_to_raw_body() {
        let err = ClientError::remote(502, b"bad gateway");
        assert!(matches!(&err, ClientError::Remote { code: None, message, .. } if message == "bad gateway"));
        assert!(matches!(cairn_core::Error::from(err), cairn_core::Error::InstanceUnreachable(_)));
    }

    #[test]
    fn test_auth_statuses_map_through() {
        let err = ClientError::remote(401, br#"{"error":{"code":"UNAUTHORIZED","message":"unknown token"}}"#);
        assert!(matches!(cairn_core::Error::from(err), cairn_core::Error::Unauthorized(m) if m == "unknown token"));

        let err = ClientError::remote(403, b"{}");
        assert!(matches!(cairn_core::Error::from(err), cairn_core::Error::Forbidden(_)));
    }
}
