//! Handler error types.

use thiserror::Error;

pub type HandlerResult<T> = Result<T, HandlerError>;

/// Failure modes of the per-job lifecycle.
///
/// Every variant is terminal for the job it occurs in; the orchestrator
/// converts it into the single `failed` status event.
#[derive(Debug, Error)]
pub enum HandlerError {
    /// Missing or disallowed worker path; the worker is never contacted.
    #[error("{0}")]
    Validation(String),

    /// Invalid handler configuration, fatal at startup.
    #[error("Configuration error: {0}")]
    Config(String),

    /// The worker never became ready within the gate timeout.
    #[error("FFmpeg worker is not healthy after waiting period.")]
    HealthTimeout,

    #[error(transparent)]
    Downstream(#[from] mbridge_ffmpeg_client::DownstreamError),

    #[error(transparent)]
    Upload(#[from] mbridge_storage::StorageError),
}

impl HandlerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }
}
