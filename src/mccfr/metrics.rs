//! Training metrics: a shared iteration counter plus a checkpoint gate so the logger thread only
//! emits once per interval.
//!
//! Counts are plain atomic increments rather than a thread-local counter flushed periodically: the
//! worker pool has every thread calling `inc_epoch` directly and only the separate logger thread
//! calling `checkpoint`, so a thread-local counter would never be read back on the thread that
//! needs it. One iteration here is already a full episode, so a direct atomic increment is
//! negligible next to the per-infoset mutex traffic inside it.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::{Duration, Instant};

/// How often the logger thread is willing to emit a checkpoint line and persist a snapshot.
pub const TRAINING_LOG_INTERVAL: Duration = Duration::from_secs(5);

pub struct Metrics {
    epoch: AtomicUsize,
    episodes: AtomicUsize,
    start: Instant,
    check: Mutex<Instant>,
}

impl Default for Metrics {
    fn default() -> Self {
        let now = Instant::now();
        Self { epoch: AtomicUsize::new(0), episodes: AtomicUsize::new(0), start: now, check: Mutex::new(now) }
    }
}

impl Metrics {
    /// Called once per completed iteration by the worker that ran it.
    pub fn inc_epoch(&self) {
        self.epoch.fetch_add(1, Ordering::Relaxed);
    }

    pub fn add_episodes(&self, n: usize) {
        self.episodes.fetch_add(n, Ordering::Relaxed);
    }

    pub fn epoch(&self) -> usize {
        self.epoch.load(Ordering::Relaxed)
    }

    pub fn episodes(&self) -> usize {
        self.episodes.load(Ordering::Relaxed)
    }

    pub fn elapsed(&self) -> Duration {
        self.start.elapsed()
    }

    pub fn format(&self) -> String {
        let rate = self.episodes() as f64 / self.elapsed().as_secs().max(1) as f64;
        format!(
            "{:<20}{:<20}{:<20}",
            format!("epoch {}", self.epoch()),
            format!("episodes {}", self.episodes()),
            format!("ep/sec {rate:.1}"),
        )
    }

    /// Returns a formatted line only if `TRAINING_LOG_INTERVAL` has elapsed since the last call
    /// to return `Some`; advances the checkpoint clock when it does.
    pub fn checkpoint(&self) -> Option<String> {
        let mut last = self.check.lock().expect("metrics checkpoint mutex poisoned");
        if last.elapsed() >= TRAINING_LOG_INTERVAL {
            *last = Instant::now();
            drop(last);
            Some(self.format())
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn epoch_and_episode_counts_accumulate_across_threads() {
        let metrics = Metrics::default();
        std::thread::scope(|scope| {
            for _ in 0..4 {
                scope.spawn(|| {
                    for _ in 0..10 {
                        metrics.inc_epoch();
                        metrics.add_episodes(2);
                    }
                });
            }
        });
        assert_eq!(metrics.epoch(), 40);
        assert_eq!(metrics.episodes(), 80);
    }

    #[test]
    fn checkpoint_only_fires_once_per_interval() {
        let metrics = Metrics::default();
        assert!(metrics.checkpoint().is_none(), "interval has not elapsed yet");
    }
}
