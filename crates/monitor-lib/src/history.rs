//! Bounded in-memory sample history
//!
//! Insertion-ordered ring of samples with FIFO eviction at capacity and
//! age-based cleanup. Timestamps must strictly increase; a stale or
//! duplicate timestamp is dropped rather than reordering the window.

use std::collections::VecDeque;
use std::time::Duration;

use tracing::debug;

use crate::models::MetricSample;

/// Default maximum number of retained samples
pub const MAX_SAMPLES: usize = 500;

/// Bounded FIFO store of metric samples
#[derive(Debug)]
pub struct MetricHistory {
    samples: VecDeque<MetricSample>,
    max_samples: usize,
}

impl MetricHistory {
    pub fn new(max_samples: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(max_samples.min(MAX_SAMPLES)),
            max_samples,
        }
    }

    /// Append a sample, evicting the oldest entry beyond capacity.
    ///
    /// Returns false if the sample was dropped for a non-increasing
    /// timestamp.
    pub fn push(&mut self, sample: MetricSample) -> bool {
        if let Some(newest) = self.samples.back() {
            if sample.timestamp <= newest.timestamp {
                debug!(
                    timestamp = sample.timestamp,
                    newest = newest.timestamp,
                    "Dropping out-of-order sample"
                );
                return false;
            }
        }

        while self.samples.len() >= self.max_samples {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
        true
    }

    /// Remove samples older than `now - max_age`
    pub fn cleanup(&mut self, now_ms: i64, max_age: Duration) {
        let cutoff = now_ms - max_age.as_millis() as i64;
        while let Some(oldest) = self.samples.front() {
            if oldest.timestamp >= cutoff {
                break;
            }
            self.samples.pop_front();
        }
    }

    /// Most recent sample, if any
    pub fn latest(&self) -> Option<&MetricSample> {
        self.samples.back()
    }

    /// Oldest retained sample, if any
    pub fn earliest(&self) -> Option<&MetricSample> {
        self.samples.front()
    }

    /// Owned snapshot of the full window, oldest first
    pub fn snapshot(&self) -> Vec<MetricSample> {
        self.samples.iter().cloned().collect()
    }

    /// Owned snapshot of the most recent `limit` samples, oldest first
    pub fn snapshot_tail(&self, limit: usize) -> Vec<MetricSample> {
        let skip = self.samples.len().saturating_sub(limit);
        self.samples.iter().skip(skip).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.max_samples
    }

    pub fn clear(&mut self) {
        self.samples.clear();
    }
}

impl Default for MetricHistory {
    fn default() -> Self {
        Self::new(MAX_SAMPLES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_at(ts: i64) -> MetricSample {
        MetricSample {
            timestamp: ts,
            ..Default::default()
        }
    }

    #[test]
    fn test_fifo_eviction_at_capacity() {
        let mut history = MetricHistory::new(3);
        for ts in 1..=5 {
            assert!(history.push(sample_at(ts)));
        }

        assert_eq!(history.len(), 3);
        assert_eq!(history.capacity(), 3);
        assert_eq!(history.earliest().unwrap().timestamp, 3);
        assert_eq!(history.latest().unwrap().timestamp, 5);
    }

    #[test]
    fn test_out_of_order_sample_dropped() {
        let mut history = MetricHistory::new(10);
        assert!(history.push(sample_at(100)));
        assert!(!history.push(sample_at(100)));
        assert!(!history.push(sample_at(50)));
        assert!(history.push(sample_at(101)));

        assert_eq!(history.len(), 2);
    }

    #[test]
    fn test_cleanup_by_age() {
        let mut history = MetricHistory::new(10);
        for ts in [1_000, 2_000, 3_000, 4_000] {
            history.push(sample_at(ts));
        }

        history.cleanup(5_000, Duration::from_millis(2_500));

        assert_eq!(history.len(), 2);
        assert_eq!(history.earliest().unwrap().timestamp, 3_000);
    }

    #[test]
    fn test_snapshot_tail() {
        let mut history = MetricHistory::new(10);
        for ts in 1..=6 {
            history.push(sample_at(ts));
        }

        let tail = history.snapshot_tail(2);
        assert_eq!(tail.len(), 2);
        assert_eq!(tail[0].timestamp, 5);
        assert_eq!(tail[1].timestamp, 6);

        // Limit larger than the window returns everything
        assert_eq!(history.snapshot_tail(100).len(), 6);
    }
}
