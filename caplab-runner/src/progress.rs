//! Progress and status reporting for sweeps.
//!
//! The optimizer never talks to a UI directly. It reports through a
//! [`SweepObserver`], called from worker threads, so implementations must be
//! `Sync` and should return quickly.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

/// Receives sweep progress and free-text status updates.
pub trait SweepObserver: Sync {
    /// Percent of pairs finished, 0..=100. Values never decrease within a sweep.
    fn on_progress(&self, percent: u8);

    /// Human-readable status line.
    fn on_status(&self, status: &str);
}

/// Routes progress and status into the `log` facade.
pub struct LogObserver;

impl SweepObserver for LogObserver {
    fn on_progress(&self, percent: u8) {
        log::debug!("sweep progress: {percent}%");
    }

    fn on_status(&self, status: &str) {
        log::info!("{status}");
    }
}

/// Discards everything.
pub struct NullObserver;

impl SweepObserver for NullObserver {
    fn on_progress(&self, _percent: u8) {}

    fn on_status(&self, _status: &str) {}
}

/// Counts finished pairs across workers and emits a non-decreasing percent.
///
/// The completion counter is atomic. Emission happens under a lock holding the
/// last value sent, so two workers finishing close together can never deliver
/// 60 after 70.
pub(crate) struct ProgressTracker<'a> {
    observer: &'a dyn SweepObserver,
    total: usize,
    completed: AtomicUsize,
    last_emitted: Mutex<u8>,
}

impl<'a> ProgressTracker<'a> {
    pub(crate) fn new(observer: &'a dyn SweepObserver, total: usize) -> Self {
        Self {
            observer,
            total,
            completed: AtomicUsize::new(0),
            last_emitted: Mutex::new(0),
        }
    }

    /// Record one finished pair and notify the observer.
    pub(crate) fn pair_finished(&self) {
        let done = self.completed.fetch_add(1, Ordering::SeqCst) + 1;
        let percent = percent_of(done, self.total);

        // A poisoned lock only means another observer call panicked; the
        // stored value is still a valid high-water mark.
        let mut last = self
            .last_emitted
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        *last = (*last).max(percent);
        self.observer.on_progress(*last);
    }

    pub(crate) fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }
}

fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    ((done.min(total) * 100) / total) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        progress: Mutex<Vec<u8>>,
    }

    impl SweepObserver for Recorder {
        fn on_progress(&self, percent: u8) {
            self.progress.lock().unwrap().push(percent);
        }

        fn on_status(&self, _status: &str) {}
    }

    #[test]
    fn percent_rounds_down_and_caps() {
        assert_eq!(percent_of(0, 3), 0);
        assert_eq!(percent_of(1, 3), 33);
        assert_eq!(percent_of(3, 3), 100);
        assert_eq!(percent_of(5, 3), 100);
        assert_eq!(percent_of(0, 0), 100);
    }

    #[test]
    fn tracker_emits_once_per_pair_ending_at_100() {
        let recorder = Recorder::default();
        let tracker = ProgressTracker::new(&recorder, 4);
        for _ in 0..4 {
            tracker.pair_finished();
        }
        assert_eq!(tracker.completed(), 4);
        assert_eq!(*recorder.progress.lock().unwrap(), vec![25, 50, 75, 100]);
    }

    #[test]
    fn tracker_is_monotonic_across_threads() {
        let recorder = Recorder::default();
        let tracker = ProgressTracker::new(&recorder, 200);
        std::thread::scope(|s| {
            for _ in 0..8 {
                s.spawn(|| {
                    for _ in 0..25 {
                        tracker.pair_finished();
                    }
                });
            }
        });

        let seen = recorder.progress.lock().unwrap();
        assert_eq!(seen.len(), 200);
        assert!(seen.windows(2).all(|w| w[0] <= w[1]));
        assert_eq!(*seen.last().unwrap(), 100);
    }

    #[test]
    fn stock_observers_accept_calls() {
        LogObserver.on_progress(50);
        LogObserver.on_status("halfway");
        NullObserver.on_progress(100);
        NullObserver.on_status("done");
    }
}
