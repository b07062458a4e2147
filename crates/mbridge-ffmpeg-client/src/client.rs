//! FFmpeg worker HTTP client.

use std::time::Duration;

use reqwest::Client;
use tracing::{debug, warn};

use crate::error::{DownstreamError, DownstreamResult};
use crate::types::WorkerResponse;

/// Configuration for the FFmpeg worker client.
#[derive(Debug, Clone)]
pub struct FfmpegClientConfig {
    /// Base URL of the worker service (no trailing slash)
    pub base_url: String,
    /// Bound on a single forward call; transcoding runs are long
    pub request_timeout: Duration,
    /// Bound on a single readiness probe, distinct from the gate timeout
    pub probe_timeout: Duration,
}

impl Default for FfmpegClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:3000".to_string(),
            request_timeout: Duration::from_secs(900), // 15 minutes
            probe_timeout: Duration::from_secs(4),
        }
    }
}

impl FfmpegClientConfig {
    /// Create config from environment variables.
    ///
    /// `FFMPEG_API_URL` wins; otherwise the worker is assumed local on
    /// `PORT` (default 3000).
    pub fn from_env() -> Self {
        let base_url = std::env::var("FFMPEG_API_URL").unwrap_or_else(|_| {
            let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
            format!("http://127.0.0.1:{}", port)
        });

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            request_timeout: Duration::from_secs(
                std::env::var("FFMPEG_API_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(900),
            ),
            probe_timeout: Duration::from_secs(
                std::env::var("FFMPEG_PROBE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(4),
            ),
        }
    }
}

/// Client for the local FFmpeg worker service.
///
/// Holds one pooled HTTP client, constructed once and reused across
/// forward calls.
#[derive(Clone)]
pub struct FfmpegClient {
    http: Client,
    config: FfmpegClientConfig,
}

impl FfmpegClient {
    /// Create a new client.
    pub fn new(config: FfmpegClientConfig) -> DownstreamResult<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(|e| DownstreamError::generic(e.to_string()))?;

        Ok(Self { http, config })
    }

    /// Create from environment variables.
    pub fn from_env() -> DownstreamResult<Self> {
        Self::new(FfmpegClientConfig::from_env())
    }

    /// Base URL this client talks to.
    pub fn base_url(&self) -> &str {
        &self.config.base_url
    }

    /// Probe the worker's health endpoint.
    ///
    /// Ready iff the worker answers HTTP 200 within the probe timeout.
    pub async fn health_check(&self) -> bool {
        let url = format!("{}/health", self.config.base_url);

        match self
            .http
            .get(&url)
            .timeout(self.config.probe_timeout)
            .send()
            .await
        {
            Ok(response) if response.status().is_success() => true,
            Ok(response) => {
                warn!("Health check failed: {}", response.status());
                false
            }
            Err(e) => {
                warn!("Health check error: {}", e);
                false
            }
        }
    }

    /// Forward a job body to the worker API.
    ///
    /// Callers must validate `path` against the allow-list before invoking
    /// this. The call blocks for up to the configured request timeout.
    pub async fn forward(
        &self,
        path: &str,
        body: &serde_json::Value,
    ) -> DownstreamResult<WorkerResponse> {
        let url = format!(
            "{}/api/{}",
            self.config.base_url,
            path.trim_start_matches('/')
        );

        debug!("Forwarding request to {}", url);

        let response = self
            .http
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(DownstreamError::from_transport)?;

        let bytes = response
            .bytes()
            .await
            .map_err(DownstreamError::from_transport)?;

        if bytes.is_empty() {
            return Err(DownstreamError::EmptyResponse);
        }

        serde_json::from_slice(&bytes).map_err(|e| DownstreamError::malformed(e.to_string()))
    }
}
