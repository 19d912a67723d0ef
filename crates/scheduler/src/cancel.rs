//! Cancellation tokens for running jobs
//!
//! A token is handed to every job the worker runs. Only stoppable jobs are
//! expected to look at it: the scheduler sets it when a stoppable job must
//! give way to a more urgent one (and will be resumed later), or when the
//! job is cancelled outright.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

/// Cancellation token for cooperative job stopping
///
/// Clones share the same state, so the scheduler keeps one clone while the
/// running job polls another.
///
/// # Example
///
/// ```
/// use pageview_scheduler::CancellationToken;
///
/// let token = CancellationToken::new();
/// let job_token = token.clone();
///
/// token.stop_and_resume();
/// assert!(job_token.is_cancelled());
/// assert!(job_token.will_resume());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<TokenState>,
}

#[derive(Debug, Default)]
struct TokenState {
    cancelled: AtomicBool,
    will_resume: AtomicBool,
}

impl CancellationToken {
    /// Create a token in the non-cancelled state
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel for good. The job will not be re-queued.
    pub fn cancel(&self) {
        self.inner.will_resume.store(false, Ordering::Release);
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Ask the job to stop so that it can be resumed later.
    ///
    /// Has no effect on a token that was already cancelled for good.
    pub fn stop_and_resume(&self) {
        if self.is_cancelled() {
            return;
        }
        self.inner.will_resume.store(true, Ordering::Release);
        self.inner.cancelled.store(true, Ordering::Release);
    }

    /// Whether the job has been asked to stop
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Whether the stop request expects the job to be resumed
    pub fn will_resume(&self) -> bool {
        self.is_cancelled() && self.inner.will_resume.load(Ordering::Acquire)
    }
}
