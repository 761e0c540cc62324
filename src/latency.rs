use std::collections::VecDeque;
use std::time::{Duration, Instant};

use serde::Serialize;

const WINDOW_SIZE: usize = 1000;

#[derive(Debug, Clone, Default, Serialize)]
pub struct LatencyStats {
    pub p50_us: u64,
    pub p95_us: u64,
    pub p99_us: u64,
    pub min_us: u64,
    pub max_us: u64,
    pub count: usize,
}

/// Sliding window of engine run times.
pub struct LatencyTracker {
    samples: VecDeque<u64>,
}

impl Default for LatencyTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl LatencyTracker {
    pub fn new() -> Self {
        Self { samples: VecDeque::with_capacity(WINDOW_SIZE) }
    }

    pub fn reset(&mut self) {
        self.samples.clear();
    }

    /// Time `f`, record the sample, and pass its result through.
    pub fn measure<T>(&mut self, f: impl FnOnce() -> T) -> T {
        let start = Instant::now();
        let out = f();
        self.record(start.elapsed());
        out
    }

    pub fn record(&mut self, elapsed: Duration) {
        if self.samples.len() >= WINDOW_SIZE {
            self.samples.pop_front();
        }
        self.samples.push_back(elapsed.as_micros() as u64);
    }

    pub fn stats(&self) -> LatencyStats {
        compute_stats(&self.samples)
    }
}

fn compute_stats(q: &VecDeque<u64>) -> LatencyStats {
    if q.is_empty() {
        return LatencyStats::default();
    }
    let mut sorted: Vec<u64> = q.iter().copied().collect();
    sorted.sort_unstable();
    let n = sorted.len();
    LatencyStats {
        p50_us: sorted[n * 50 / 100],
        p95_us: sorted[n * 95 / 100],
        p99_us: sorted[(n * 99 / 100).min(n - 1)],
        min_us: sorted[0],
        max_us: sorted[n - 1],
        count: n,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_tracker_reports_zeroes() {
        let stats = LatencyTracker::new().stats();
        assert_eq!(stats.count, 0);
        assert_eq!(stats.p99_us, 0);
    }

    #[test]
    fn percentiles_over_known_samples() {
        let mut tracker = LatencyTracker::new();
        for us in 1..=100 {
            tracker.record(Duration::from_micros(us));
        }
        let stats = tracker.stats();
        assert_eq!(stats.count, 100);
        assert_eq!(stats.min_us, 1);
        assert_eq!(stats.max_us, 100);
        assert_eq!(stats.p50_us, 51);
        assert_eq!(stats.p95_us, 96);
        assert_eq!(stats.p99_us, 100);
    }

    #[test]
    fn window_is_capped() {
        let mut tracker = LatencyTracker::new();
        for us in 0..(WINDOW_SIZE as u64 + 50) {
            tracker.record(Duration::from_micros(us));
        }
        let stats = tracker.stats();
        assert_eq!(stats.count, WINDOW_SIZE);
        assert_eq!(stats.min_us, 50);
    }

    #[test]
    fn measure_passes_result_through() {
        let mut tracker = LatencyTracker::new();
        let v = tracker.measure(|| 41 + 1);
        assert_eq!(v, 42);
        assert_eq!(tracker.stats().count, 1);
    }
}
