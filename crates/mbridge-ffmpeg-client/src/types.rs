//! Wire types of the FFmpeg worker API.

use serde::{Deserialize, Serialize};

use mbridge_models::Output;

/// Response body of a worker API call.
///
/// The worker answers `{"outputs": [...]}` on success and
/// `{"error": "..."}` on an application-level failure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WorkerResponse {
    /// Artifacts produced by the invocation
    #[serde(default)]
    pub outputs: Vec<Output>,

    /// Application-level failure message
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl WorkerResponse {
    /// Check whether the worker reported an application-level failure.
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }
}
