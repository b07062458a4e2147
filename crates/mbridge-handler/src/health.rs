//! Readiness gating against the FFmpeg worker.

use std::time::Duration;

use async_trait::async_trait;
use tokio::time::{sleep, Instant};
use tracing::debug;

use mbridge_ffmpeg_client::FfmpegClient;

/// One readiness probe against the downstream worker.
///
/// Implementations carry their own short per-probe timeout; a hung probe
/// simply counts toward the gate's elapsed budget.
#[async_trait]
pub trait ReadinessProbe: Send + Sync {
    async fn is_ready(&self) -> bool;
}

#[async_trait]
impl ReadinessProbe for FfmpegClient {
    async fn is_ready(&self) -> bool {
        self.health_check().await
    }
}

/// Result of a gate wait.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateStatus {
    Ready,
    TimedOut,
}

/// Bounded readiness wait with cooperative poll sleeps.
#[derive(Debug, Clone)]
pub struct HealthGate {
    pub timeout: Duration,
    pub poll_interval: Duration,
}

impl Default for HealthGate {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            poll_interval: Duration::from_secs(5),
        }
    }
}

impl HealthGate {
    pub fn new(timeout: Duration, poll_interval: Duration) -> Self {
        Self {
            timeout,
            poll_interval,
        }
    }

    /// Poll the probe until it succeeds or the timeout elapses.
    ///
    /// Success returns immediately, with no trailing sleep. Only the
    /// calling task blocks; the sleeps are cooperative.
    pub async fn wait_until_ready(&self, probe: &dyn ReadinessProbe) -> GateStatus {
        let start = Instant::now();

        loop {
            if probe.is_ready().await {
                return GateStatus::Ready;
            }

            if start.elapsed() >= self.timeout {
                return GateStatus::TimedOut;
            }

            debug!("Worker not ready, retrying in {:?}", self.poll_interval);
            sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::atomic::{AtomicU32, Ordering};

    struct FixedProbe {
        ready: bool,
        attempts: AtomicU32,
    }

    impl FixedProbe {
        fn new(ready: bool) -> Self {
            Self {
                ready,
                attempts: AtomicU32::new(0),
            }
        }

        fn attempts(&self) -> u32 {
            self.attempts.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ReadinessProbe for FixedProbe {
        async fn is_ready(&self) -> bool {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            self.ready
        }
    }

    /// Becomes ready after a fixed number of failed probes.
    struct EventuallyReadyProbe {
        ready_after: u32,
        attempts: AtomicU32,
    }

    #[async_trait]
    impl ReadinessProbe for EventuallyReadyProbe {
        async fn is_ready(&self) -> bool {
            self.attempts.fetch_add(1, Ordering::SeqCst) >= self.ready_after
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_ready_probe_returns_immediately() {
        let gate = HealthGate::default();
        let probe = FixedProbe::new(true);

        let start = Instant::now();
        let status = gate.wait_until_ready(&probe).await;

        assert_eq!(status, GateStatus::Ready);
        assert_eq!(probe.attempts(), 1);
        // No sleeps happened: even with the clock paused, elapsed is zero.
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failing_probe_times_out_within_attempt_band() {
        let gate = HealthGate::new(Duration::from_secs(30), Duration::from_secs(5));
        let probe = FixedProbe::new(false);

        let status = gate.wait_until_ready(&probe).await;

        assert_eq!(status, GateStatus::TimedOut);
        let attempts = probe.attempts();
        assert!(
            (6..=7).contains(&attempts),
            "expected 6-7 attempts, got {}",
            attempts
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_readiness_is_observed() {
        let gate = HealthGate::new(Duration::from_secs(30), Duration::from_secs(5));
        let probe = EventuallyReadyProbe {
            ready_after: 3,
            attempts: AtomicU32::new(0),
        };

        let status = gate.wait_until_ready(&probe).await;
        assert_eq!(status, GateStatus::Ready);
        assert_eq!(probe.attempts.load(Ordering::SeqCst), 4);
    }
}
