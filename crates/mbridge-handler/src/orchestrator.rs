//! Per-job lifecycle orchestration.

use std::sync::Arc;

use metrics::counter;
use tracing::{error, info, warn};

use mbridge_ffmpeg_client::FfmpegClient;
use mbridge_models::{Job, JobId, JobOutcome, StatusEvent};
use mbridge_storage::{ObjectStore, UploadRouter};

use crate::callback::{CallbackDispatcher, ProgressSink};
use crate::config::HandlerConfig;
use crate::error::HandlerError;
use crate::health::{GateStatus, HealthGate};

/// Drives one job through
/// `Received → Validated → HealthGated → Forwarded → Uploaded →
/// {Completed | Failed}`.
///
/// Every failure mode collapses into a structured `JobOutcome`; exactly one
/// terminal status event is emitted per job.
pub struct JobOrchestrator {
    config: HandlerConfig,
    client: FfmpegClient,
    store: Arc<dyn ObjectStore>,
    sink: Arc<dyn ProgressSink>,
    http: reqwest::Client,
}

impl JobOrchestrator {
    pub fn new(
        config: HandlerConfig,
        client: FfmpegClient,
        store: Arc<dyn ObjectStore>,
        sink: Arc<dyn ProgressSink>,
    ) -> Self {
        Self {
            config,
            client,
            store,
            sink,
            http: reqwest::Client::new(),
        }
    }

    /// Process one job to its terminal state.
    pub async fn run(&self, job: &Job) -> JobOutcome {
        let run_id = &job.id;
        let metadata = &job.input.metadata;
        let dispatcher =
            CallbackDispatcher::for_job(Arc::clone(&self.sink), self.http.clone(), &job.input);

        // Received → Validated: reject before any downstream contact.
        let path = job.input.path.as_str();
        if !self.config.is_path_allowed(path) {
            let error = HandlerError::validation(format!(
                "Missing 'path' in job input or invalid path: {}",
                path
            ));
            warn!(job_id = %run_id, "Job rejected: {}", error);
            return self.fail(&dispatcher, run_id, metadata, error.to_string()).await;
        }

        // Validated → HealthGated
        dispatcher
            .emit(&StatusEvent::processing(run_id, metadata))
            .await;

        let gate = HealthGate::new(self.config.health_timeout, self.config.health_poll_interval);
        if gate.wait_until_ready(&self.client).await == GateStatus::TimedOut {
            return self
                .fail(
                    &dispatcher,
                    run_id,
                    metadata,
                    HandlerError::HealthTimeout.to_string(),
                )
                .await;
        }

        // HealthGated → Forwarded
        info!(job_id = %run_id, path = %path, "Forwarding job to media worker");
        let response = match self.client.forward(path, &job.input.body).await {
            Ok(response) => response,
            Err(e) => {
                let error = HandlerError::from(e);
                return self.fail(&dispatcher, run_id, metadata, error.to_string()).await;
            }
        };

        if let Some(message) = response.error {
            return self.fail(&dispatcher, run_id, metadata, message).await;
        }

        // Forwarded → Uploaded: skipped when the job carries no upload spec.
        let output = match &job.input.upload {
            Some(spec) => {
                let router = UploadRouter::new(Arc::clone(&self.store));
                let artifacts = match router.upload_outputs(&response.outputs, spec).await {
                    Ok(artifacts) => artifacts,
                    Err(e) => {
                        let error = HandlerError::from(e);
                        return self.fail(&dispatcher, run_id, metadata, error.to_string()).await;
                    }
                };
                match serde_json::to_value(artifacts) {
                    Ok(value) => value,
                    Err(e) => {
                        return self.fail(&dispatcher, run_id, metadata, e.to_string()).await
                    }
                }
            }
            None => match serde_json::to_value(&response.outputs) {
                Ok(value) => value,
                Err(e) => return self.fail(&dispatcher, run_id, metadata, e.to_string()).await,
            },
        };

        // Uploaded → Completed
        dispatcher
            .emit(&StatusEvent::completed(run_id, metadata, output.clone()))
            .await;
        counter!("bridge_jobs_completed_total").increment(1);
        info!(job_id = %run_id, "Job completed");

        JobOutcome::Completed { output }
    }

    /// Emit the single terminal failed event and build the outcome.
    async fn fail(
        &self,
        dispatcher: &CallbackDispatcher,
        run_id: &JobId,
        metadata: &serde_json::Value,
        error: String,
    ) -> JobOutcome {
        error!(job_id = %run_id, "Job failed: {}", error);
        dispatcher
            .emit(&StatusEvent::failed(run_id, metadata, &error))
            .await;
        counter!("bridge_jobs_failed_total").increment(1);

        JobOutcome::Failed { error }
    }
}
