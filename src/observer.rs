//! Observer trait for progress and warning events.
//!
//! Inject an [`Arc<dyn ConversionObserver>`] via
//! [`crate::config::ConversionConfigBuilder::observer`] to receive events as
//! an extractor works through a document. The library itself never prints:
//! the OCR extractor reports page progress here, and the container extractor
//! forwards non-fatal parser warnings here, so the core carries no implicit
//! global output state.
//!
//! Both methods have default no-op implementations; callers override only
//! what they care about. The trait is `Send + Sync` so an observer can be
//! shared with a batch driver that parallelises across files.

use std::sync::Arc;

/// Receives progress and warning events during a single conversion.
pub trait ConversionObserver: Send + Sync {
    /// Called periodically during OCR extraction.
    ///
    /// # Arguments
    /// * `current` — 1-based index of the page (or image) just finished
    /// * `total`   — number of pages (or images) being processed
    fn on_progress(&self, current: usize, total: usize) {
        let _ = (current, total);
    }

    /// Called for non-fatal issues: container-parser warnings and skipped
    /// embedded images whose OCR failed.
    fn on_warning(&self, message: &str) {
        let _ = message;
    }
}

/// A no-op implementation for callers that don't need events.
///
/// This is the default when no observer is configured.
pub struct NoopObserver;

impl ConversionObserver for NoopObserver {}

/// Convenience alias matching the type stored in [`crate::config::ConversionConfig`].
pub type Observer = Arc<dyn ConversionObserver>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct TrackingObserver {
        progress: AtomicUsize,
        warnings: AtomicUsize,
        last_total: AtomicUsize,
    }

    impl ConversionObserver for TrackingObserver {
        fn on_progress(&self, _current: usize, total: usize) {
            self.progress.fetch_add(1, Ordering::SeqCst);
            self.last_total.store(total, Ordering::SeqCst);
        }

        fn on_warning(&self, _message: &str) {
            self.warnings.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_observer_does_not_panic() {
        let obs = NoopObserver;
        obs.on_progress(1, 5);
        obs.on_warning("some warning");
    }

    #[test]
    fn tracking_observer_receives_events() {
        let obs = TrackingObserver {
            progress: AtomicUsize::new(0),
            warnings: AtomicUsize::new(0),
            last_total: AtomicUsize::new(0),
        };

        obs.on_progress(1, 3);
        obs.on_progress(3, 3);
        obs.on_warning("table had no rows");

        assert_eq!(obs.progress.load(Ordering::SeqCst), 2);
        assert_eq!(obs.warnings.load(Ordering::SeqCst), 1);
        assert_eq!(obs.last_total.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn arc_dyn_observer_works() {
        let obs: Arc<dyn ConversionObserver> = Arc::new(NoopObserver);
        obs.on_progress(1, 10);
        obs.on_warning("shared across threads");
    }
}
