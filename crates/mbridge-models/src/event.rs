//! Status events and the structured job outcome.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::job::JobId;

/// Job processing status carried by a status event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job is actively being processed
    Processing,
    /// Job completed successfully
    Completed,
    /// Job failed with an error
    Failed,
}

impl JobStatus {
    /// Get string representation of the status.
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Processing => "processing",
            JobStatus::Completed => "completed",
            JobStatus::Failed => "failed",
        }
    }

    /// Check if this is a terminal state (no more events expected).
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed)
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A notification describing a job's current or terminal state.
///
/// Exactly one `completed` or `failed` event terminates a job; any number
/// of `processing` events may precede it.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct StatusEvent {
    /// Run ID of the originating job
    pub run_id: JobId,
    /// Current status
    pub status: JobStatus,
    /// Status payload (error message, upload results, progress)
    pub data: serde_json::Value,
    /// Caller metadata echoed from the job input
    pub metadata: serde_json::Value,
}

impl StatusEvent {
    /// A processing event with an empty payload.
    pub fn processing(run_id: &JobId, metadata: &serde_json::Value) -> Self {
        Self {
            run_id: run_id.clone(),
            status: JobStatus::Processing,
            data: serde_json::json!({}),
            metadata: metadata.clone(),
        }
    }

    /// The terminal completed event carrying the job output.
    pub fn completed(
        run_id: &JobId,
        metadata: &serde_json::Value,
        output: serde_json::Value,
    ) -> Self {
        Self {
            run_id: run_id.clone(),
            status: JobStatus::Completed,
            data: serde_json::json!({ "output": output }),
            metadata: metadata.clone(),
        }
    }

    /// The terminal failed event carrying the error message.
    pub fn failed(run_id: &JobId, metadata: &serde_json::Value, error: impl Into<String>) -> Self {
        Self {
            run_id: run_id.clone(),
            status: JobStatus::Failed,
            data: serde_json::json!({ "error": error.into() }),
            metadata: metadata.clone(),
        }
    }

    /// Progress indicator carried in the event data, when present.
    pub fn progress(&self) -> u8 {
        self.data
            .get("progress")
            .and_then(|v| v.as_u64())
            .map(|v| v.min(100) as u8)
            .unwrap_or(0)
    }
}

/// The structured result at the orchestrator boundary.
///
/// Serializes to `{"output": ...}` or `{"error": "..."}`, the shape the
/// job runtime expects back from the handler.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum JobOutcome {
    Completed { output: serde_json::Value },
    Failed { error: String },
}

impl JobOutcome {
    /// Check whether the job completed.
    pub fn is_completed(&self) -> bool {
        matches!(self, JobOutcome::Completed { .. })
    }

    /// The error message of a failed outcome.
    pub fn error(&self) -> Option<&str> {
        match self {
            JobOutcome::Failed { error } => Some(error),
            JobOutcome::Completed { .. } => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_terminality() {
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed.is_terminal());
    }

    #[test]
    fn test_event_wire_shape() {
        let run_id = JobId::from_string("run-1");
        let meta = serde_json::json!({ "tenant": "acme" });
        let event = StatusEvent::failed(&run_id, &meta, "boom");

        let value = serde_json::to_value(&event).unwrap();
        assert_eq!(value["run_id"], "run-1");
        assert_eq!(value["status"], "failed");
        assert_eq!(value["data"]["error"], "boom");
        assert_eq!(value["metadata"]["tenant"], "acme");
    }

    #[test]
    fn test_progress_extraction() {
        let run_id = JobId::from_string("run-1");
        let mut event = StatusEvent::processing(&run_id, &serde_json::json!({}));
        assert_eq!(event.progress(), 0);

        event.data = serde_json::json!({ "progress": 42 });
        assert_eq!(event.progress(), 42);

        event.data = serde_json::json!({ "progress": 400 });
        assert_eq!(event.progress(), 100);
    }

    #[test]
    fn test_outcome_serialization() {
        let done = JobOutcome::Completed {
            output: serde_json::json!([{ "name": "a.mp4" }]),
        };
        let value = serde_json::to_value(&done).unwrap();
        assert!(value.get("output").is_some());

        let failed = JobOutcome::Failed {
            error: "worker not ready".into(),
        };
        let value = serde_json::to_value(&failed).unwrap();
        assert_eq!(value["error"], "worker not ready");
    }
}
