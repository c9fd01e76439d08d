//! Per-batch outcome counters and the accept/reject decision

use std::sync::atomic::{AtomicU64, Ordering};

/// Processed/errored counters for one batch.
///
/// Shared between the dispatching task and the workers; every record
/// increments exactly one of the two counters exactly once.
#[derive(Debug, Default)]
pub struct BatchStats {
    processed: AtomicU64,
    errors: AtomicU64,
}

impl BatchStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_success(&self) {
        self.processed.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_error(&self) {
        self.errors.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_errors(&self, count: u64) {
        self.errors.fetch_add(count, Ordering::Relaxed);
    }

    /// Read both counters. Only meaningful once all workers have been joined.
    pub fn snapshot(&self) -> StatsSnapshot {
        StatsSnapshot {
            processed: self.processed.load(Ordering::Acquire),
            errors: self.errors.load(Ordering::Acquire),
        }
    }
}

/// Final counts of a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StatsSnapshot {
    pub processed: u64,
    pub errors: u64,
}

impl StatsSnapshot {
    pub fn total(&self) -> u64 {
        self.processed + self.errors
    }

    /// `errors / processed`, or `None` when nothing was processed.
    pub fn error_rate(&self) -> Option<f64> {
        (self.processed > 0).then(|| self.errors as f64 / self.processed as f64)
    }

    /// Apply the acceptance rule against `threshold`.
    pub fn verdict(&self, threshold: f64) -> LoadVerdict {
        match self.error_rate() {
            None => LoadVerdict::Empty,
            Some(rate) if rate < threshold => LoadVerdict::Accepted { error_rate: rate },
            Some(rate) => LoadVerdict::Rejected { error_rate: rate },
        }
    }
}

/// Result of evaluating a finished batch
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum LoadVerdict {
    /// Error rate below threshold
    Accepted { error_rate: f64 },
    /// Error rate at or above threshold
    Rejected { error_rate: f64 },
    /// No record was written successfully; no rate is computed
    Empty,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::sync::Arc;

    fn snapshot(processed: u64, errors: u64) -> StatsSnapshot {
        StatsSnapshot { processed, errors }
    }

    #[test]
    fn test_no_errors_accepted() {
        assert_eq!(
            snapshot(100, 0).verdict(0.01),
            LoadVerdict::Accepted { error_rate: 0.0 }
        );
    }

    #[test]
    fn test_two_percent_rejected() {
        assert_eq!(
            snapshot(100, 2).verdict(0.01),
            LoadVerdict::Rejected { error_rate: 0.02 }
        );
    }

    #[test]
    fn test_exact_threshold_rejected() {
        assert!(matches!(snapshot(100, 1).verdict(0.01), LoadVerdict::Rejected { .. }));
    }

    #[test]
    fn test_zero_processed_is_empty() {
        assert_eq!(snapshot(0, 0).error_rate(), None);
        assert_eq!(snapshot(0, 57).verdict(0.01), LoadVerdict::Empty);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_not_lost() {
        let stats = Arc::new(BatchStats::new());
        let mut handles = Vec::new();
        for i in 0..16 {
            let stats = stats.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..1_000 {
                    if i % 4 == 0 {
                        stats.record_error();
                    } else {
                        stats.record_success();
                    }
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        let totals = stats.snapshot();
        assert_eq!(totals.errors, 4_000);
        assert_eq!(totals.processed, 12_000);
        assert_eq!(totals.total(), 16_000);
    }
}
