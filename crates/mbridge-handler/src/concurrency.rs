//! Adaptive concurrency control.

use std::sync::Mutex;
use std::time::Duration;

use metrics::gauge;
use tokio::time::Instant;
use tracing::debug;

use crate::error::{HandlerError, HandlerResult};
use crate::rate::RateTracker;

/// Trailing window over which the arrival rate is measured.
pub const RATE_WINDOW: Duration = Duration::from_secs(60);

/// Bounds and thresholds of the concurrency step function.
#[derive(Debug, Clone)]
pub struct ConcurrencySettings {
    /// Lower bound on the concurrency level
    pub min: u32,
    /// Upper bound on the concurrency level
    pub max: u32,
    /// Arrivals per window above which the level steps up
    pub high_threshold: u32,
    /// Arrivals per window at or below which the level steps down
    pub low_threshold: u32,
}

impl Default for ConcurrencySettings {
    fn default() -> Self {
        Self {
            min: 2,
            max: 5,
            high_threshold: 5,
            low_threshold: 2,
        }
    }
}

impl ConcurrencySettings {
    /// Create settings from environment variables.
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            min: env_u32("CONCURRENCY_MIN", defaults.min),
            max: env_u32("CONCURRENCY_MAX", defaults.max),
            high_threshold: env_u32("CONCURRENCY_RATE_HIGH", defaults.high_threshold),
            low_threshold: env_u32("CONCURRENCY_RATE_LOW", defaults.low_threshold),
        }
    }

    /// Reject inverted bounds; fatal at startup.
    pub fn validate(&self) -> HandlerResult<()> {
        if self.min > self.max {
            return Err(HandlerError::config(format!(
                "concurrency min {} exceeds max {}",
                self.min, self.max
            )));
        }
        Ok(())
    }

    /// One bounded step of the level given the recent arrival rate.
    ///
    /// The band between the thresholds holds the level steady so the
    /// controller does not oscillate. The step is always exactly 1.
    pub fn adjust(&self, level: u32, rate: u32) -> u32 {
        if rate > self.high_threshold && level < self.max {
            level + 1
        } else if rate <= self.low_threshold && level > self.min {
            level - 1
        } else {
            level
        }
    }
}

fn env_u32(name: &str, default: u32) -> u32 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Shared admission state: arrival tracker plus the current level.
///
/// Owned by the runtime adapter and passed by `Arc` into every job's
/// arrival hook and each admission decision; the only cross-job mutable
/// state in the bridge.
pub struct ConcurrencyController {
    settings: ConcurrencySettings,
    tracker: RateTracker,
    level: Mutex<u32>,
}

impl ConcurrencyController {
    /// Create a controller starting at the minimum level.
    pub fn new(settings: ConcurrencySettings) -> HandlerResult<Self> {
        settings.validate()?;
        let level = Mutex::new(settings.min);
        Ok(Self {
            settings,
            tracker: RateTracker::default(),
            level,
        })
    }

    /// Per-job arrival hook.
    pub fn record_arrival(&self) {
        self.tracker.record_now();
    }

    /// Recompute and return the concurrency level.
    pub fn current_limit(&self) -> u32 {
        let now = Instant::now();
        let rate = match now.checked_sub(RATE_WINDOW) {
            Some(cutoff) => self.tracker.count_since(cutoff),
            None => self.tracker.len(),
        } as u32;

        let mut level = self.level.lock().expect("concurrency lock poisoned");
        *level = self.settings.adjust(*level, rate);

        debug!(rate = rate, level = *level, "Recomputed concurrency level");
        gauge!("bridge_concurrency_limit").set(*level as f64);

        *level
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_adjust_stays_in_bounds_for_any_rate() {
        let settings = ConcurrencySettings::default();
        for level in settings.min..=settings.max {
            for rate in [0u32, 1, 2, 3, 5, 6, 50, 10_000] {
                let next = settings.adjust(level, rate);
                assert!(next >= settings.min && next <= settings.max);
            }
        }
    }

    #[test]
    fn test_high_rate_steps_up_by_one_until_max() {
        let settings = ConcurrencySettings::default();
        let rate = settings.high_threshold + 1;

        let mut level = settings.min;
        level = settings.adjust(level, rate);
        assert_eq!(level, settings.min + 1);

        for _ in 0..10 {
            level = settings.adjust(level, rate);
        }
        assert_eq!(level, settings.max);
    }

    #[test]
    fn test_low_rate_steps_down_by_one_until_min() {
        let settings = ConcurrencySettings::default();
        let rate = settings.low_threshold;

        let mut level = settings.max;
        level = settings.adjust(level, rate);
        assert_eq!(level, settings.max - 1);

        for _ in 0..10 {
            level = settings.adjust(level, rate);
        }
        assert_eq!(level, settings.min);
    }

    #[test]
    fn test_band_between_thresholds_holds_level() {
        let settings = ConcurrencySettings::default();
        for level in settings.min..=settings.max {
            for rate in (settings.low_threshold + 1)..=settings.high_threshold {
                assert_eq!(settings.adjust(level, rate), level);
            }
        }
    }

    #[test]
    fn test_step_is_never_larger_than_one() {
        let settings = ConcurrencySettings::default();
        assert_eq!(settings.adjust(settings.min, 10_000), settings.min + 1);
        assert_eq!(settings.adjust(settings.max, 0), settings.max - 1);
    }

    #[test]
    fn test_inverted_bounds_are_rejected() {
        let settings = ConcurrencySettings {
            min: 6,
            max: 5,
            ..ConcurrencySettings::default()
        };
        assert!(settings.validate().is_err());
        assert!(ConcurrencyController::new(settings).is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_controller_tracks_arrivals() {
        let controller = ConcurrencyController::new(ConcurrencySettings::default()).unwrap();
        assert_eq!(controller.current_limit(), 2);

        for _ in 0..6 {
            controller.record_arrival();
        }
        assert_eq!(controller.current_limit(), 3);
        assert_eq!(controller.current_limit(), 4);

        // Arrivals age out of the window; the level decays back to min.
        tokio::time::advance(Duration::from_secs(61)).await;
        assert_eq!(controller.current_limit(), 3);
        assert_eq!(controller.current_limit(), 2);
        assert_eq!(controller.current_limit(), 2);
    }
}
