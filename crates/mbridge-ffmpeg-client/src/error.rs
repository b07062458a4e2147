//! Downstream error taxonomy.

use thiserror::Error;

pub type DownstreamResult<T> = Result<T, DownstreamError>;

/// Classified failure of a call to the media worker.
///
/// Every failure mode of the forward path surfaces as one of these values;
/// nothing unwinds past the client boundary.
#[derive(Debug, Error)]
pub enum DownstreamError {
    #[error("media worker request timed out")]
    Timeout,

    #[error("connection to media worker refused")]
    ConnectionRefused,

    #[error("media worker returned an empty response")]
    EmptyResponse,

    #[error("media worker returned a malformed response: {0}")]
    MalformedResponse(String),

    #[error("media worker request failed: {0}")]
    Generic(String),
}

impl DownstreamError {
    /// Classify a transport-level failure.
    pub fn from_transport(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionRefused
        } else {
            Self::Generic(e.to_string())
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedResponse(msg.into())
    }

    pub fn generic(msg: impl Into<String>) -> Self {
        Self::Generic(msg.into())
    }
}
