//! Handler configuration.

use std::time::Duration;

use crate::concurrency::ConcurrencySettings;
use crate::error::HandlerResult;

/// Handler configuration.
#[derive(Debug, Clone)]
pub struct HandlerConfig {
    /// Worker API paths jobs are allowed to invoke
    pub allowed_paths: Vec<String>,
    /// Bound on the readiness gate
    pub health_timeout: Duration,
    /// Sleep between readiness probes
    pub health_poll_interval: Duration,
    /// Admission control bounds and thresholds
    pub concurrency: ConcurrencySettings,
}

impl Default for HandlerConfig {
    fn default() -> Self {
        Self {
            allowed_paths: vec!["/canvas/process".to_string()],
            health_timeout: Duration::from_secs(30),
            health_poll_interval: Duration::from_secs(5),
            concurrency: ConcurrencySettings::default(),
        }
    }
}

impl HandlerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            allowed_paths: std::env::var("ALLOWED_PATHS")
                .map(|s| {
                    s.split(',')
                        .map(|p| p.trim().to_string())
                        .filter(|p| !p.is_empty())
                        .collect()
                })
                .unwrap_or(defaults.allowed_paths),
            health_timeout: Duration::from_secs(
                std::env::var("HEALTH_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(30),
            ),
            health_poll_interval: Duration::from_secs(
                std::env::var("HEALTH_POLL_INTERVAL")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(5),
            ),
            concurrency: ConcurrencySettings::from_env(),
        }
    }

    /// Validate the configuration; violations are fatal at startup.
    pub fn validate(&self) -> HandlerResult<()> {
        self.concurrency.validate()
    }

    /// Check whether a worker path is allow-listed.
    pub fn is_path_allowed(&self, path: &str) -> bool {
        !path.is_empty() && self.allowed_paths.iter().any(|p| p == path)
    }
}
