//! Status event dispatch.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use mbridge_models::{JobId, JobInput, JobStatus, StatusEvent};

/// Bound on the best-effort external callback POST.
const CALLBACK_TIMEOUT: Duration = Duration::from_secs(10);

/// In-process progress channel of the job runtime.
#[async_trait]
pub trait ProgressSink: Send + Sync {
    /// Report progress for a running job, keyed by its run ID.
    async fn report(&self, run_id: &JobId, progress: u8);
}

/// Progress sink that logs reports; used by the standalone binary.
pub struct TracingProgressSink;

#[async_trait]
impl ProgressSink for TracingProgressSink {
    async fn report(&self, run_id: &JobId, progress: u8) {
        info!(job_id = %run_id, progress = progress, "Job progress");
    }
}

/// Emits status events to the runtime's progress channel and, best-effort,
/// to the job's callback URL.
pub struct CallbackDispatcher {
    sink: Arc<dyn ProgressSink>,
    http: reqwest::Client,
    callback_url: Option<String>,
    extra_headers: HashMap<String, String>,
}

impl CallbackDispatcher {
    /// Build a dispatcher for one job.
    pub fn for_job(sink: Arc<dyn ProgressSink>, http: reqwest::Client, input: &JobInput) -> Self {
        Self {
            sink,
            http,
            callback_url: input.callback_url.clone(),
            extra_headers: input.callback_auth_header.clone().unwrap_or_default(),
        }
    }

    /// Emit one status event.
    ///
    /// Processing events forward their progress indicator to the runtime
    /// sink. When the job supplied a callback URL, the full event is POSTed
    /// there on a detached task: delivery failures are logged and swallowed,
    /// never retried, and never touch the job's outcome.
    pub async fn emit(&self, event: &StatusEvent) {
        if event.status == JobStatus::Processing {
            self.sink.report(&event.run_id, event.progress()).await;
        }

        let Some(url) = self.callback_url.clone() else {
            return;
        };

        let http = self.http.clone();
        let headers = self.extra_headers.clone();
        let payload = event.clone();

        tokio::spawn(async move {
            let mut request = http.post(&url).timeout(CALLBACK_TIMEOUT).json(&payload);
            for (name, value) in &headers {
                request = request.header(name.as_str(), value.as_str());
            }

            match request.send().await {
                Ok(response) if response.status().is_success() => {
                    debug!("Delivered {} callback to {}", payload.status, url);
                }
                Ok(response) => {
                    warn!(
                        "Callback to {} returned {} for {} event",
                        url,
                        response.status(),
                        payload.status
                    );
                }
                Err(e) => {
                    warn!("Callback to {} failed: {}", url, e);
                }
            }
        });
    }
}
