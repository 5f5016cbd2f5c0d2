use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::watch;

/// Shared progress counter for one counting run.
///
/// The denominator is fixed at construction. Published percentages go out on
/// a watch channel and never decrease. Only `finish()` publishes 100.
#[derive(Debug)]
pub struct ProgressTracker {
    processed: AtomicU64,
    denominator: u64,
    sender: watch::Sender<f64>,
}

impl ProgressTracker {
    pub fn new(denominator: u64) -> Self {
        let (sender, _) = watch::channel(0.0);
        Self {
            processed: AtomicU64::new(0),
            denominator: denominator.max(1),
            sender,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<f64> {
        self.sender.subscribe()
    }

    pub fn denominator(&self) -> u64 {
        self.denominator
    }

    pub fn processed(&self) -> u64 {
        self.processed.load(Ordering::Acquire)
    }

    /// Last published percentage.
    pub fn percent(&self) -> f64 {
        *self.sender.borrow()
    }

    /// Adds `units` processed text units and publishes the new percentage.
    pub fn record(&self, units: u64) -> f64 {
        let processed = self.processed.fetch_add(units, Ordering::AcqRel) + units;
        let percent = to_percent(processed, self.denominator);
        self.sender.send_modify(|current| {
            if percent > *current {
                *current = percent;
            }
        });
        self.percent()
    }

    /// Marks the run complete. The declared comment counts the denominator is
    /// built from can differ from what expansion actually finds.
    pub fn finish(&self) {
        self.sender.send_modify(|current| *current = 100.0);
    }
}

/// Highest value `record()` can publish while work is still running.
pub const MAX_RUNNING_PERCENT: f64 = 99.99;

fn to_percent(processed: u64, denominator: u64) -> f64 {
    let raw = processed as f64 * 100.0 / denominator as f64;
    ((raw * 100.0).round() / 100.0).min(MAX_RUNNING_PERCENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_denominator_is_clamped() {
        let tracker = ProgressTracker::new(0);
        assert_eq!(tracker.denominator(), 1);
        assert_eq!(tracker.record(1), MAX_RUNNING_PERCENT);
    }

    #[test]
    fn test_two_decimal_precision() {
        let tracker = ProgressTracker::new(3);
        assert_eq!(tracker.record(1), 33.33);
        assert_eq!(tracker.record(1), 66.67);
    }

    #[test]
    fn test_only_finish_reaches_hundred() {
        let tracker = ProgressTracker::new(2);
        tracker.record(2);
        assert_eq!(tracker.percent(), MAX_RUNNING_PERCENT);
        tracker.record(3);
        assert_eq!(tracker.percent(), MAX_RUNNING_PERCENT);
        assert_eq!(tracker.processed(), 5);

        tracker.finish();
        assert_eq!(tracker.percent(), 100.0);
    }

    #[tokio::test]
    async fn test_subscribers_see_latest_value() {
        let tracker = ProgressTracker::new(4);
        let mut receiver = tracker.subscribe();
        tracker.record(1);
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow_and_update(), 25.0);

        tracker.finish();
        receiver.changed().await.unwrap();
        assert_eq!(*receiver.borrow(), 100.0);
    }

    #[tokio::test]
    async fn test_concurrent_records_are_not_lost() {
        let tracker = std::sync::Arc::new(ProgressTracker::new(1000));
        let mut handles = Vec::new();
        for _ in 0..10 {
            let tracker = tracker.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    tracker.record(1);
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }
        assert_eq!(tracker.processed(), 1000);
        assert_eq!(tracker.percent(), MAX_RUNNING_PERCENT);
    }
}
