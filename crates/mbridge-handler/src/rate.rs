//! Arrival-rate tracking.

use std::collections::VecDeque;
use std::sync::Mutex;

use tokio::time::Instant;

/// Default capacity of the arrival ring.
pub const DEFAULT_CAPACITY: usize = 1000;

/// Capacity-bounded ring of job-arrival timestamps.
///
/// Eviction is capacity-bounded, not time-bounded: sustained arrival rates
/// above capacity/window undercount the true rate. That approximation is
/// part of the contract and must stay.
pub struct RateTracker {
    arrivals: Mutex<VecDeque<Instant>>,
    capacity: usize,
}

impl RateTracker {
    pub fn new(capacity: usize) -> Self {
        Self {
            arrivals: Mutex::new(VecDeque::with_capacity(capacity)),
            capacity,
        }
    }

    /// Record one arrival, evicting the oldest entry when full.
    ///
    /// Safe from concurrent call sites; arrivals are low-frequency, so a
    /// plain lock is the right trade.
    pub fn record(&self, t: Instant) {
        let mut arrivals = self.arrivals.lock().expect("rate tracker lock poisoned");
        if arrivals.len() == self.capacity {
            arrivals.pop_front();
        }
        arrivals.push_back(t);
    }

    /// Record an arrival at the current instant.
    pub fn record_now(&self) {
        self.record(Instant::now());
    }

    /// Count retained arrivals strictly after `t0`.
    pub fn count_since(&self, t0: Instant) -> usize {
        let arrivals = self.arrivals.lock().expect("rate tracker lock poisoned");
        arrivals.iter().filter(|t| **t > t0).count()
    }

    /// Number of retained arrivals.
    pub fn len(&self) -> usize {
        self.arrivals.lock().expect("rate tracker lock poisoned").len()
    }

    /// Whether no arrivals are retained.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for RateTracker {
    fn default() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::time::Duration;

    #[tokio::test(start_paused = true)]
    async fn test_window_boundary_is_strict() {
        tokio::time::advance(Duration::from_secs(120)).await;
        let now = Instant::now();

        let tracker = RateTracker::default();
        tracker.record(now - Duration::from_secs(61));
        tracker.record(now - Duration::from_secs(59));

        let cutoff = now - Duration::from_secs(60);
        assert_eq!(tracker.count_since(cutoff), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_capacity_eviction_is_fifo() {
        tokio::time::advance(Duration::from_secs(120)).await;
        let now = Instant::now();

        let tracker = RateTracker::new(3);
        for age in [40u64, 30, 20, 10] {
            tracker.record(now - Duration::from_secs(age));
        }

        // Oldest entry (age 40) evicted; count over a window covering all
        // four still sees only three.
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.count_since(now - Duration::from_secs(60)), 3);
        assert_eq!(tracker.count_since(now - Duration::from_secs(35)), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn test_count_since_excludes_exact_boundary() {
        tokio::time::advance(Duration::from_secs(120)).await;
        let now = Instant::now();

        let tracker = RateTracker::default();
        tracker.record(now);

        assert_eq!(tracker.count_since(now), 0);
        assert_eq!(tracker.count_since(now - Duration::from_secs(1)), 1);
    }
}
