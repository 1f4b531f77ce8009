//! Normalized API errors.
//!
//! Every failure a caller can observe, whether it was caught by client-side
//! validation, by the transport, or reported by the server, is an [`ApiError`].
//! A status of `0` means no response reached the client.

use serde::Deserialize;
use thiserror::Error;

/// Code attached to client-side validation failures.
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// Code attached to transport failures (no response).
pub const NETWORK_ERROR: &str = "NETWORK_ERROR";
/// Code attached to 401 responses.
pub const SESSION_EXPIRED: &str = "SESSION_EXPIRED";

/// Broad class of an [`ApiError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Rejected before any request was sent
    Validation,
    /// No response reached the client (status 0)
    Network,
    /// The server answered with a 4xx/5xx status
    Http,
    /// Anything unrecognized, including undecodable bodies
    Unknown,
}

/// Result alias used throughout the crate.
pub type ApiResult<T> = Result<T, ApiError>;

/// Normalized error payload.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct ApiError {
    pub kind: ErrorKind,
    pub message: String,
    pub code: Option<String>,
    /// HTTP status, or 0 when no response was received
    pub status: u16,
}

/// Error envelope returned by the server.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
}

impl ApiError {
    /// Client-side validation failure. Shaped like a server 400 so callers
    /// need a single handling path.
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Validation,
            message: message.into(),
            code: Some(VALIDATION_ERROR.to_string()),
            status: 400,
        }
    }

    /// Transport failure: connection refused, DNS, timeout.
    pub fn network(message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Network,
            message: message.into(),
            code: Some(NETWORK_ERROR.to_string()),
            status: 0,
        }
    }

    pub fn unknown(status: u16, message: impl Into<String>) -> Self {
        Self {
            kind: ErrorKind::Unknown,
            message: message.into(),
            code: Some("UNKNOWN_ERROR".to_string()),
            status,
        }
    }

    /// Maps a non-success HTTP status and its (optional) error envelope.
    ///
    /// The server's own message and code win over the per-status defaults.
    pub fn from_response(status: u16, body: Option<ErrorBody>) -> Self {
        let (kind, code, message) = match status {
            400 => (ErrorKind::Http, "BAD_REQUEST", "The request was rejected as invalid"),
            401 => (ErrorKind::Http, SESSION_EXPIRED, "Session expired, please log in again"),
            403 => (ErrorKind::Http, "FORBIDDEN", "You are not allowed to do that"),
            404 => (ErrorKind::Http, "NOT_FOUND", "Resource not found"),
            409 => (ErrorKind::Http, "CONFLICT", "The resource was modified or already exists"),
            422 => (ErrorKind::Http, "UNPROCESSABLE_ENTITY", "The request could not be processed"),
            500..=599 => (ErrorKind::Http, "SERVER_ERROR", "The server failed to handle the request"),
            _ => (ErrorKind::Unknown, "UNKNOWN_ERROR", "Unexpected response from server"),
        };

        let body = body.unwrap_or_default();
        Self {
            kind,
            message: body
                .message
                .filter(|m| !m.trim().is_empty())
                .unwrap_or_else(|| message.to_string()),
            code: Some(body.code.unwrap_or_else(|| code.to_string())),
            status,
        }
    }

    /// True for client-side validation failures and server 400s.
    pub fn is_validation(&self) -> bool {
        self.kind == ErrorKind::Validation || (self.kind == ErrorKind::Http && self.status == 400)
    }

    pub fn is_network(&self) -> bool {
        self.kind == ErrorKind::Network
    }

    pub fn is_unauthorized(&self) -> bool {
        self.kind == ErrorKind::Http && self.status == 401
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::Http && self.status == 404
    }
}
