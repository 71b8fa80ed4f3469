//! Callback trait for workflow events.
//!
//! Inject an [`Arc<dyn WorkflowProgressCallback>`] via
//! [`crate::config::WorkflowConfigBuilder::progress_callback`] to observe a
//! submission as it moves from upload to a settled state. The trait is
//! `Send + Sync` because spawned submissions call it from tokio worker
//! threads.
//!
//! # Example
//!
//! ```rust
//! use hinge_analysis::{WorkflowConfig, WorkflowProgressCallback};
//! use std::sync::{Arc, atomic::{AtomicU32, Ordering}};
//!
//! struct AttemptCounter {
//!     attempts: AtomicU32,
//! }
//!
//! impl WorkflowProgressCallback for AttemptCounter {
//!     fn on_poll_attempt(&self, attempt: u32, max_attempts: u32) {
//!         self.attempts.store(attempt, Ordering::SeqCst);
//!         eprintln!("poll {attempt}/{max_attempts}");
//!     }
//! }
//!
//! let counter = Arc::new(AttemptCounter { attempts: AtomicU32::new(0) });
//!
//! let config = WorkflowConfig::builder()
//!     .progress_callback(counter as Arc<dyn WorkflowProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use crate::output::{Outcome, RenderedPlot};
use std::sync::Arc;

/// Called by the workflow as a submission progresses.
///
/// All methods have default no-op implementations so callers only override
/// what they care about.
pub trait WorkflowProgressCallback: Send + Sync {
    /// Called whenever the status line changes. An empty string means the
    /// status was cleared.
    fn on_status(&self, status: &str) {
        let _ = status;
    }

    /// Called just before the upload POST is sent.
    fn on_upload_start(&self, file_name: &str, size_bytes: usize) {
        let _ = (file_name, size_bytes);
    }

    /// Called when the backend acknowledged the upload and polling begins.
    fn on_upload_accepted(&self) {}

    /// Called just before each poll GET.
    ///
    /// # Arguments
    /// * `attempt`      — 1-indexed attempt number
    /// * `max_attempts` — attempt budget of this loop
    fn on_poll_attempt(&self, attempt: u32, max_attempts: u32) {
        let _ = (attempt, max_attempts);
    }

    /// Called once the results panel has been replaced with new plots.
    fn on_rendered(&self, plots: &[RenderedPlot]) {
        let _ = plots;
    }

    /// Called once per submission with its terminal outcome.
    fn on_settled(&self, outcome: &Outcome) {
        let _ = outcome;
    }
}

/// A no-op implementation for callers that don't need events.
pub struct NoopProgressCallback;

impl WorkflowProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::WorkflowConfig`].
pub type ProgressCallback = Arc<dyn WorkflowProgressCallback>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct TrackingCallback {
        statuses: Mutex<Vec<String>>,
        attempts: AtomicU32,
        rendered: AtomicU32,
    }

    impl WorkflowProgressCallback for TrackingCallback {
        fn on_status(&self, status: &str) {
            self.statuses.lock().unwrap().push(status.to_string());
        }

        fn on_poll_attempt(&self, _attempt: u32, _max_attempts: u32) {
            self.attempts.fetch_add(1, Ordering::SeqCst);
        }

        fn on_rendered(&self, plots: &[RenderedPlot]) {
            self.rendered.fetch_add(plots.len() as u32, Ordering::SeqCst);
        }
    }

    #[test]
    fn noop_callback_does_not_panic() {
        let cb = NoopProgressCallback;
        cb.on_status("Uploading...");
        cb.on_upload_start("matches.json", 12);
        cb.on_upload_accepted();
        cb.on_poll_attempt(1, 30);
        cb.on_rendered(&[]);
        cb.on_settled(&Outcome::TimedOut);
    }

    #[test]
    fn tracking_callback_receives_events() {
        let tracker = TrackingCallback::default();
        tracker.on_status("Uploading...");
        tracker.on_status("");
        tracker.on_poll_attempt(1, 3);
        tracker.on_poll_attempt(2, 3);
        tracker.on_rendered(&[RenderedPlot {
            src: "http://x/a.png".into(),
            alt: "a".into(),
            caption: Some("a".into()),
        }]);

        assert_eq!(
            *tracker.statuses.lock().unwrap(),
            vec!["Uploading...".to_string(), String::new()]
        );
        assert_eq!(tracker.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(tracker.rendered.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn arc_dyn_callback_works() {
        let cb: ProgressCallback = Arc::new(NoopProgressCallback);
        cb.on_poll_attempt(1, 30);
        cb.on_settled(&Outcome::Rendered(2));
    }
}
