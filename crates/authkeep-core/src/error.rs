//! Error types for authkeep.
//!
//! This module provides a unified error type with explicit variants for
//! transport, server, token refresh and input validation failures. Storage
//! failures have their own [`StorageError`], which never escapes the
//! [`CredentialStore`](crate::CredentialStore) facade.

use thiserror::Error;

use crate::request::ApiResponse;

/// The unified error type for authkeep operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Transport failure (connection, timeout). Never retried.
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// The server answered with a non-2xx status.
    #[error(transparent)]
    Api(#[from] ApiError),

    /// A direct token refresh failed.
    #[error("token refresh failed: {0}")]
    Refresh(#[from] RefreshError),

    /// The access token was rejected and could not be refreshed.
    ///
    /// Stored credentials have already been cleared when this is returned.
    #[error("Session expired. Please log in again.")]
    SessionExpired(#[source] RefreshError),

    /// Input validation errors (invalid URL, endpoint, body).
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InvalidInputError),
}

impl Error {
    /// Returns true when the caller must re-authenticate.
    pub fn is_session_expired(&self) -> bool {
        matches!(self, Error::SessionExpired(_))
    }

    /// Returns the HTTP status for server-side failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Error::Api(err) => Some(err.status),
            _ => None,
        }
    }
}

/// Transport-level errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NetworkError {
    /// Network connection failed.
    #[error("connection failed: {message}")]
    Connection { message: String },

    /// Request timed out.
    #[error("request timed out after {duration_ms}ms")]
    Timeout { duration_ms: u64 },

    /// Any other transport failure.
    #[error("HTTP error: {message}")]
    Http { message: String },
}

/// A non-2xx answer from the API, or a 2xx answer whose body is not JSON.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ApiError {
    /// HTTP status code.
    pub status: u16,
    /// Server-provided `error` message, or a generic fallback.
    pub message: String,
}

impl ApiError {
    /// Message used when the server does not provide one.
    pub const DEFAULT_MESSAGE: &'static str = "API request failed";

    /// Create a new API error.
    pub fn new(status: u16, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    /// Build an error from a failed response, using its `error` field if present.
    pub fn from_response(response: &ApiResponse) -> Self {
        let message = serde_json::from_slice::<serde_json::Value>(&response.body)
            .ok()
            .and_then(|body| {
                body.get("error")
                    .and_then(serde_json::Value::as_str)
                    .map(str::to_owned)
            })
            .unwrap_or_else(|| Self::DEFAULT_MESSAGE.to_string());

        Self::new(response.status, message)
    }

    /// Check if the server rejected the credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status == 401
    }
}

/// Reasons a refresh-token exchange can fail.
///
/// Cloneable so that one in-flight refresh can report its outcome to every
/// caller waiting on it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RefreshError {
    /// No refresh token is stored; the network was not contacted.
    #[error("no refresh token")]
    MissingRefreshToken,

    /// The refresh endpoint answered with a non-2xx status.
    #[error("refresh rejected")]
    Rejected { status: u16 },

    /// The refresh endpoint did not return both tokens.
    #[error("malformed response")]
    Malformed,

    /// The exchange did not complete.
    #[error("refresh exchange failed: {0}")]
    Network(NetworkError),
}

/// Failures reported by a [`KeyValueStore`](crate::KeyValueStore) backend.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The backend could not be reached or an I/O operation failed.
    #[error("storage unavailable: {message}")]
    Unavailable { message: String },

    /// Stored data could not be decoded.
    #[error("stored data is corrupt: {message}")]
    Corrupt { message: String },
}

/// Input validation errors.
#[derive(Debug, Error)]
pub enum InvalidInputError {
    /// Invalid API base URL.
    #[error("invalid API URL '{value}': {reason}")]
    ApiUrl { value: String, reason: String },

    /// Invalid endpoint path or URL.
    #[error("invalid endpoint '{value}': {reason}")]
    Endpoint { value: String, reason: String },

    /// Generic invalid input.
    #[error("invalid input: {message}")]
    Other { message: String },
}
