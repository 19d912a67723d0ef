//! Jobs, their lifecycle events and the factories that mint them
//!
//! A job goes through three events: start, zero or more progress events
//! carrying a payload, and done. Done is emitted from a drop guard, so it
//! fires exactly once even if the work fails or panics.

use crate::cancel::CancellationToken;
use crate::priority::JobPriority;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Job identifier, unique within the factory that created the job
pub type JobId = u64;

/// A unit of asynchronous work run by a [`JobScheduler`](crate::JobScheduler)
pub trait Job: Send {
    /// Identifier assigned by the job's factory
    fn id(&self) -> JobId;

    /// Name of the factory that created this job
    fn factory_name(&self) -> &'static str;

    /// Scheduling priority (smaller values run first)
    fn priority(&self) -> JobPriority;

    /// Whether the job may be interrupted once it has started.
    ///
    /// Jobs that cannot stop are only skippable while still queued.
    fn can_stop(&self) -> bool {
        false
    }

    /// Run the job on the scheduler's worker thread.
    ///
    /// Stoppable jobs should return early once `token.is_cancelled()`.
    fn run(&mut self, token: &CancellationToken);
}

type StartListener = Box<dyn Fn(JobId) + Send>;
type ProgressListener<T> = Box<dyn Fn(JobId, T) + Send>;
type DoneListener = Box<dyn Fn(JobId) + Send>;

/// Listeners for the start/progress/done events of one job
///
/// Listeners run synchronously on the thread that emits the event, which is
/// the scheduler's worker. Anything touching UI state must re-post itself
/// through an [`IdleSender`](crate::IdleSender).
pub struct JobEvents<T> {
    start: Vec<StartListener>,
    progress: Vec<ProgressListener<T>>,
    done: Vec<DoneListener>,
}

impl<T: Clone> JobEvents<T> {
    /// Create an event set with no listeners
    pub fn new() -> Self {
        Self {
            start: Vec::new(),
            progress: Vec::new(),
            done: Vec::new(),
        }
    }

    /// Register a listener for the start event
    pub fn connect_start<F>(&mut self, listener: F)
    where
        F: Fn(JobId) + Send + 'static,
    {
        self.start.push(Box::new(listener));
    }

    /// Register a listener for progress events
    pub fn connect_progress<F>(&mut self, listener: F)
    where
        F: Fn(JobId, T) + Send + 'static,
    {
        self.progress.push(Box::new(listener));
    }

    /// Register a listener for the done event
    pub fn connect_done<F>(&mut self, listener: F)
    where
        F: Fn(JobId) + Send + 'static,
    {
        self.done.push(Box::new(listener));
    }

    /// Notify start listeners that the job began running
    pub fn emit_start(&self, job_id: JobId) {
        for listener in &self.start {
            listener(job_id);
        }
    }

    /// Deliver a payload to every progress listener, in connection order
    pub fn emit_progress(&self, job_id: JobId, payload: T) {
        if let Some((last, rest)) = self.progress.split_last() {
            for listener in rest {
                listener(job_id, payload.clone());
            }
            last(job_id, payload);
        }
    }

    /// Notify done listeners that the job finished, whatever the outcome
    pub fn emit_done(&self, job_id: JobId) {
        for listener in &self.done {
            listener(job_id);
        }
    }

    /// Run `work` between a start and a done event.
    ///
    /// The payload is emitted as a progress event only when `work` succeeds.
    /// Failures are logged and swallowed here. The done event is emitted from
    /// a guard, so it also fires when `work` or a listener panics.
    pub fn run_guarded<E, F>(&self, job_id: JobId, work: F)
    where
        E: fmt::Display,
        F: FnOnce() -> Result<T, E>,
    {
        self.emit_start(job_id);
        let _done = DoneGuard {
            events: self,
            job_id,
        };

        match work() {
            Ok(payload) => self.emit_progress(job_id, payload),
            Err(err) => tracing::warn!(job_id, error = %err, "job failed"),
        }
    }
}

impl<T: Clone> Default for JobEvents<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for JobEvents<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobEvents")
            .field("start", &self.start.len())
            .field("progress", &self.progress.len())
            .field("done", &self.done.len())
            .finish()
    }
}

struct DoneGuard<'a, T: Clone> {
    events: &'a JobEvents<T>,
    job_id: JobId,
}

impl<T: Clone> Drop for DoneGuard<'_, T> {
    fn drop(&mut self) {
        self.events.emit_done(self.job_id);
    }
}

/// Name and id generator shared by all jobs of one factory
///
/// Concrete factories embed one of these and call [`JobFactory::next_id`]
/// for each job they build.
#[derive(Debug)]
pub struct JobFactory {
    name: &'static str,
    id_generator: AtomicU64,
}

impl JobFactory {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            id_generator: AtomicU64::new(0),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Next job id. Ids increase monotonically and never repeat.
    pub fn next_id(&self) -> JobId {
        self.id_generator.fetch_add(1, Ordering::Relaxed)
    }
}
