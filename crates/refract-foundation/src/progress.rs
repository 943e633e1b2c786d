//! Progress and cancellation for batch operations
//!
//! A [`ProgressHandle`] pairs a cooperative cancellation token with a
//! weighted work counter. Callers declare the total amount of work with
//! [`ProgressHandle::begin`] and carve it into [`WorkUnit`]s, one per
//! independent event. A unit credits its weight when it is dropped, so every
//! exit path of an event (success, skip, failure) advances the counter.
//!
//! Cancellation is only observed between units; a unit that already started
//! runs to completion.
//!
//! ```rust
//! use refract_foundation::progress::ProgressHandle;
//!
//! let progress = ProgressHandle::new("Computing rename updates");
//! progress.begin(200);
//! for _ in 0..2 {
//!     if progress.is_cancelled() {
//!         break;
//!     }
//!     let _unit = progress.split(100);
//!     // ... process one event ...
//! }
//! assert_eq!(progress.percentage(), 100);
//! ```

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

#[derive(Debug)]
struct ProgressInner {
    title: String,
    total: AtomicU64,
    worked: AtomicU64,
}

/// Cancellable, shareable progress tracker
///
/// Cloning yields a handle over the same counter and token, so a transport
/// layer can keep one clone to cancel while the request runs on another.
#[derive(Debug, Clone)]
pub struct ProgressHandle {
    inner: Arc<ProgressInner>,
    cancel: CancellationToken,
}

impl ProgressHandle {
    pub fn new(title: impl Into<String>) -> Self {
        Self::with_token(title, CancellationToken::new())
    }

    /// Create a handle driven by an existing cancellation token
    pub fn with_token(title: impl Into<String>, cancel: CancellationToken) -> Self {
        Self {
            inner: Arc::new(ProgressInner {
                title: title.into(),
                total: AtomicU64::new(0),
                worked: AtomicU64::new(0),
            }),
            cancel,
        }
    }

    pub fn title(&self) -> &str {
        &self.inner.title
    }

    /// Declare additional work to be performed
    pub fn begin(&self, work: u64) {
        self.inner.total.fetch_add(work, Ordering::SeqCst);
        debug!(title = %self.inner.title, work, "Progress started");
    }

    /// Reserve `weight` units of work, credited when the returned unit drops
    pub fn split(&self, weight: u64) -> WorkUnit {
        WorkUnit {
            progress: self.clone(),
            weight,
            done: false,
        }
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub fn total(&self) -> u64 {
        self.inner.total.load(Ordering::SeqCst)
    }

    pub fn worked(&self) -> u64 {
        self.inner.worked.load(Ordering::SeqCst)
    }

    /// Completed share of the declared work, 0-100
    pub fn percentage(&self) -> u32 {
        let total = self.total();
        if total == 0 {
            return 0;
        }
        let worked = self.worked().min(total);
        ((worked * 100) / total) as u32
    }

    fn credit(&self, weight: u64) {
        self.inner.worked.fetch_add(weight, Ordering::SeqCst);
        trace!(
            title = %self.inner.title,
            percentage = self.percentage(),
            "Progress report"
        );
    }
}

/// Reserved slice of a [`ProgressHandle`]'s work
#[derive(Debug)]
#[must_use = "a work unit credits its weight when dropped"]
pub struct WorkUnit {
    progress: ProgressHandle,
    weight: u64,
    done: bool,
}

impl WorkUnit {
    pub fn weight(&self) -> u64 {
        self.weight
    }

    pub fn is_cancelled(&self) -> bool {
        self.progress.is_cancelled()
    }

    /// Credit the unit now instead of at drop
    pub fn done(mut self) {
        self.finish();
    }

    fn finish(&mut self) {
        if !self.done {
            self.done = true;
            self.progress.credit(self.weight);
        }
    }
}

impl Drop for WorkUnit {
    fn drop(&mut self) {
        self.finish();
    }
}
