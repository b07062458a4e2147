//! Job definitions as received from the job runtime.

use std::collections::HashMap;
use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::upload::UploadSpec;

/// Unique identifier for a job run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(transparent)]
pub struct JobId(pub String);

impl JobId {
    /// Generate a new random job ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Create from an existing string.
    pub fn from_string(s: impl Into<String>) -> Self {
        Self(s.into())
    }

    /// Get the inner string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for JobId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One unit of work handed over by the job runtime.
///
/// Immutable once received; the orchestrator processing it is the sole
/// owner.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct Job {
    /// Runtime-assigned run ID
    pub id: JobId,

    /// Job payload
    pub input: JobInput,
}

/// The payload of a job.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct JobInput {
    /// Worker API path to invoke (must be allow-listed)
    #[serde(default)]
    pub path: String,

    /// Request body forwarded to the worker verbatim
    #[serde(default = "empty_object")]
    pub body: serde_json::Value,

    /// Where to place produced artifacts; absent skips the upload step
    #[serde(skip_serializing_if = "Option::is_none")]
    pub upload: Option<UploadSpec>,

    /// Caller metadata echoed back on every status event
    #[serde(default = "empty_object")]
    pub metadata: serde_json::Value,

    /// Optional external URL notified on every status event
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,

    /// Extra headers merged into the external callback request
    #[serde(skip_serializing_if = "Option::is_none")]
    pub callback_auth_header: Option<HashMap<String, String>>,
}

fn empty_object() -> serde_json::Value {
    serde_json::Value::Object(serde_json::Map::new())
}

impl Default for JobInput {
    fn default() -> Self {
        Self {
            path: String::new(),
            body: empty_object(),
            upload: None,
            metadata: empty_object(),
            callback_url: None,
            callback_auth_header: None,
        }
    }
}

impl Job {
    /// Create a job with a fresh run ID.
    pub fn new(input: JobInput) -> Self {
        Self {
            id: JobId::new(),
            input,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_job_input_defaults() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "id": "run-1",
            "input": { "path": "/canvas/process" }
        }))
        .unwrap();

        assert_eq!(job.id.as_str(), "run-1");
        assert_eq!(job.input.path, "/canvas/process");
        assert_eq!(job.input.body, serde_json::json!({}));
        assert_eq!(job.input.metadata, serde_json::json!({}));
        assert!(job.input.upload.is_none());
        assert!(job.input.callback_url.is_none());
    }

    #[test]
    fn test_job_full_wire_shape() {
        let job: Job = serde_json::from_value(serde_json::json!({
            "id": "run-2",
            "input": {
                "path": "/canvas/process",
                "body": { "preset": "social" },
                "upload": {
                    "bucket": "media",
                    "key": "videos/out.mp4",
                    "cloud_type": "AWS",
                    "credentials": {
                        "aws_access_key_id": "AKIA",
                        "aws_secret_access_key": "secret"
                    }
                },
                "metadata": { "tenant": "acme" },
                "callback_url": "https://example.com/hook",
                "callback_auth_header": { "Authorization": "Bearer t" }
            }
        }))
        .unwrap();

        let upload = job.input.upload.expect("upload spec");
        assert_eq!(upload.bucket, "media");
        assert_eq!(upload.key, "videos/out.mp4");
        assert_eq!(
            job.input.callback_auth_header.unwrap().get("Authorization"),
            Some(&"Bearer t".to_string())
        );
    }
}
