use reqwest::StatusCode;
use thiserror::Error;

/// Result type for backend API calls
pub type ApiResult<T> = Result<T, ApiError>;

/// Errors that can occur while talking to the LMS backend
#[derive(Debug, Error)]
pub enum ApiError {
    /// Transport-level failure (connect, timeout, body read).
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Non-2xx response. `detail` carries the backend's `{"detail": ...}`
    /// message when one was present, otherwise a generic description.
    #[error("request failed ({status}): {detail}")]
    Status { status: StatusCode, detail: String },

    /// 2xx response whose body did not match the expected record shape.
    #[error("invalid response body from {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    InvalidUrl(#[from] url::ParseError),
}

impl ApiError {
    /// True when the backend answered with the given status code.
    pub fn is_status(&self, code: StatusCode) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == code)
    }
}
