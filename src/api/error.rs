use thiserror::Error;

/// Errors returned by the backend client.
///
/// Callers do not distinguish client from server failures; the status code is
/// kept for logging.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ApiError {
    /// The request never produced a response (connection refused, timeout, ...).
    #[error("network error: {detail}")]
    Network { detail: String },

    /// The backend answered with a non-success status.
    #[error("request failed with HTTP {status}: {body}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("failed to parse response: {detail}")]
    Parse { detail: String },

    #[error("invalid API base URL: {0}")]
    InvalidUrl(String),
}
