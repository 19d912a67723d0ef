//! Per-kind job scheduler
//!
//! A [`JobScheduler`] owns one priority queue and one worker thread, so at
//! most one of its jobs runs at a time. Separate schedulers (one for page
//! images, one for page boxes) run concurrently with each other.

use crate::cancel::CancellationToken;
use crate::error::{SchedulerError, SchedulerResult};
use crate::job::{Job, JobId};
use crate::priority::{JobPriority, PendingJob, PriorityQueue};
use crate::worker;
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Configuration for a scheduler's worker thread
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum time the idle worker waits before re-checking for shutdown.
    /// Default: 100ms.
    pub poll_interval: Duration,

    /// Prefix of the worker thread name; the scheduler name is appended.
    pub thread_name_prefix: String,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(100),
            thread_name_prefix: "pageview-jobs".to_string(),
        }
    }
}

impl SchedulerConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the poll interval for the worker
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// Set the worker thread name prefix
    pub fn with_thread_name_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }
}

/// Job scheduler statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchedulerStats {
    /// Total jobs submitted
    pub jobs_submitted: u64,

    /// Jobs whose run returned normally
    pub jobs_completed: u64,

    /// Jobs removed before running, or stopped for good
    pub jobs_cancelled: u64,

    /// Jobs whose run panicked
    pub jobs_panicked: u64,

    /// Times a running stoppable job was put back in the queue
    pub jobs_preempted: u64,

    /// Current queue size
    pub queue_size: usize,
}

impl SchedulerStats {
    /// Jobs submitted but not yet finished (queued or running)
    pub fn pending_jobs(&self) -> u64 {
        self.jobs_submitted - self.jobs_completed - self.jobs_cancelled - self.jobs_panicked
    }
}

/// The job currently held by the worker
pub(crate) struct ActiveJob {
    pub(crate) id: JobId,
    pub(crate) factory_name: &'static str,
    pub(crate) priority: JobPriority,
    pub(crate) can_stop: bool,
    pub(crate) token: CancellationToken,
}

pub(crate) struct SchedulerState {
    pub(crate) queue: PriorityQueue,
    pub(crate) active: Option<ActiveJob>,
    pub(crate) stats: SchedulerStats,
    pub(crate) stopped: bool,
}

/// State shared between the scheduler handle and its worker thread
pub(crate) struct Shared {
    state: Mutex<SchedulerState>,
    /// Signalled when a job is queued or the scheduler stops
    pub(crate) work_available: Condvar,
    /// Signalled every time the worker finishes a job
    pub(crate) job_finished: Condvar,
}

impl Shared {
    pub(crate) fn lock(&self) -> MutexGuard<'_, SchedulerState> {
        // A panicking job never holds this lock, so a poisoned state is still consistent
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Priority scheduler with a single dedicated worker thread
///
/// Jobs run by ascending priority value, FIFO within equal priority.
/// Submission never blocks on running work. A panic inside a job is caught
/// by the worker and does not stop the scheduler.
///
/// # Example
///
/// ```
/// use pageview_scheduler::{CancellationToken, Job, JobId, JobPriority, JobScheduler};
/// use std::time::Duration;
///
/// struct Hello(JobId);
///
/// impl Job for Hello {
///     fn id(&self) -> JobId { self.0 }
///     fn factory_name(&self) -> &'static str { "Hello" }
///     fn priority(&self) -> JobPriority { JobPriority::new(100) }
///     fn run(&mut self, _token: &CancellationToken) {
///         println!("hello from job {}", self.0);
///     }
/// }
///
/// let scheduler = JobScheduler::new("hello");
/// scheduler.start().unwrap();
/// scheduler.schedule(Box::new(Hello(0))).unwrap();
/// assert!(scheduler.wait_idle(Duration::from_secs(5)));
/// scheduler.stop();
/// ```
pub struct JobScheduler {
    name: String,
    config: SchedulerConfig,
    shared: Arc<Shared>,
    worker: Mutex<Option<JoinHandle<()>>>,
}

impl JobScheduler {
    /// Create a scheduler. Jobs are queued until [`JobScheduler::start`] is called.
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_config(name, SchedulerConfig::default())
    }

    pub fn with_config(name: impl Into<String>, config: SchedulerConfig) -> Self {
        Self {
            name: name.into(),
            config,
            shared: Arc::new(Shared {
                state: Mutex::new(SchedulerState {
                    queue: PriorityQueue::new(),
                    active: None,
                    stats: SchedulerStats::default(),
                    stopped: false,
                }),
                work_available: Condvar::new(),
                job_finished: Condvar::new(),
            }),
            worker: Mutex::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Spawn the worker thread
    pub fn start(&self) -> SchedulerResult<()> {
        let mut worker = self.worker.lock().unwrap_or_else(PoisonError::into_inner);
        if worker.is_some() {
            return Err(SchedulerError::AlreadyRunning {
                name: self.name.clone(),
            });
        }
        if self.shared.lock().stopped {
            return Err(SchedulerError::Stopped(self.name.clone()));
        }

        let thread_name = format!("{}-{}", self.config.thread_name_prefix, self.name);
        let handle = worker::spawn(
            thread_name,
            self.name.clone(),
            self.shared.clone(),
            self.config.poll_interval,
        )
        .map_err(|source| SchedulerError::Spawn {
            name: self.name.clone(),
            source,
        })?;
        *worker = Some(handle);

        tracing::debug!(scheduler = %self.name, "scheduler started");
        Ok(())
    }

    /// Whether the worker thread has been started and not stopped
    pub fn is_running(&self) -> bool {
        let has_worker = self
            .worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some();
        has_worker && !self.shared.lock().stopped
    }

    /// Queue a job
    ///
    /// If the running job can stop and the new job is more urgent, the running
    /// job is asked to stop and will be resumed after the urgent work.
    pub fn schedule(&self, job: Box<dyn Job>) -> SchedulerResult<()> {
        let mut state = self.shared.lock();
        if state.stopped {
            return Err(SchedulerError::Stopped(self.name.clone()));
        }

        let priority = job.priority();
        if let Some(active) = &state.active {
            if active.can_stop && priority.runs_before(active.priority) {
                tracing::debug!(
                    scheduler = %self.name,
                    job_id = active.id,
                    factory = active.factory_name,
                    "preempting running job"
                );
                active.token.stop_and_resume();
            }
        }

        tracing::debug!(
            scheduler = %self.name,
            job_id = job.id(),
            factory = job.factory_name(),
            %priority,
            "job scheduled"
        );
        state.queue.push(job);
        state.stats.jobs_submitted += 1;
        drop(state);

        self.shared.work_available.notify_one();
        Ok(())
    }

    /// Cancel a job by factory and id
    ///
    /// A queued job is removed. A running job is only interrupted if it can
    /// stop. Returns `true` if a job was found.
    pub fn cancel(&self, factory_name: &str, job_id: JobId) -> bool {
        let mut state = self.shared.lock();
        let removed = state
            .queue
            .remove_if(|job| job.factory_name() == factory_name && job.id() == job_id);
        if removed > 0 {
            state.stats.jobs_cancelled += removed as u64;
            return true;
        }

        match &state.active {
            Some(active) if active.factory_name == factory_name && active.id == job_id => {
                if active.can_stop {
                    active.token.cancel();
                }
                true
            }
            _ => false,
        }
    }

    /// Cancel every queued job created by the named factory
    ///
    /// The running job, if it belongs to that factory and can stop, is
    /// stopped for good as well. Returns the number of queued jobs removed.
    pub fn cancel_matching_jobs(&self, factory_name: &str) -> usize {
        let mut state = self.shared.lock();
        let removed = state
            .queue
            .remove_if(|job| job.factory_name() == factory_name);
        state.stats.jobs_cancelled += removed as u64;

        if let Some(active) = &state.active {
            if active.can_stop && active.factory_name == factory_name {
                active.token.cancel();
            }
        }

        if removed > 0 {
            tracing::debug!(scheduler = %self.name, factory = factory_name, removed, "cancelled queued jobs");
        }
        removed
    }

    /// Number of queued jobs (not counting the running one)
    pub fn pending_jobs(&self) -> usize {
        self.shared.lock().queue.len()
    }

    pub fn has_pending_jobs(&self) -> bool {
        !self.shared.lock().queue.is_empty()
    }

    /// Queued jobs in the order they will run
    pub fn pending_jobs_list(&self) -> Vec<PendingJob> {
        self.shared.lock().queue.pending()
    }

    /// Whether a job is currently running
    pub fn is_busy(&self) -> bool {
        self.shared.lock().active.is_some()
    }

    pub fn stats(&self) -> SchedulerStats {
        let state = self.shared.lock();
        let mut stats = state.stats.clone();
        stats.queue_size = state.queue.len();
        stats
    }

    /// Block until the queue is empty and no job runs, or the timeout expires.
    ///
    /// Returns `true` if the scheduler became idle.
    pub fn wait_idle(&self, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        let mut state = self.shared.lock();
        loop {
            if state.active.is_none() && (state.queue.is_empty() || state.stopped) {
                return true;
            }
            let now = Instant::now();
            if now >= deadline {
                return false;
            }
            state = self
                .shared
                .job_finished
                .wait_timeout(state, deadline - now)
                .unwrap_or_else(PoisonError::into_inner)
                .0;
        }
    }

    /// Stop the scheduler and wait for its worker thread
    ///
    /// Queued jobs are dropped, a running stoppable job is cancelled, and the
    /// worker thread is joined once its current job returns. Further calls to
    /// [`JobScheduler::schedule`] fail.
    pub fn stop(&self) {
        self.shutdown();

        let Some(handle) = self.take_worker() else {
            return;
        };
        if handle.thread().id() == thread::current().id() {
            // Stopped from inside one of its own jobs; the loop exits on its own
            return;
        }
        if handle.join().is_err() {
            tracing::error!(scheduler = %self.name, "worker thread panicked");
        }
    }

    /// Stop the scheduler without waiting for the running job
    ///
    /// Same as [`JobScheduler::stop`] except that the worker thread is
    /// detached: it exits on its own once its current job returns. Used when
    /// the owner is torn down from the UI thread.
    pub fn detach(&self) {
        self.shutdown();
        if self.take_worker().is_some() {
            tracing::debug!(scheduler = %self.name, "worker detached");
        }
    }

    fn shutdown(&self) {
        let mut state = self.shared.lock();
        if !state.stopped {
            state.stopped = true;
            let dropped = state.queue.clear();
            state.stats.jobs_cancelled += dropped as u64;
            if let Some(active) = &state.active {
                if active.can_stop {
                    active.token.cancel();
                }
            }
            tracing::debug!(scheduler = %self.name, dropped, "scheduler stopping");
        }
        drop(state);
        self.shared.work_available.notify_all();
    }

    fn take_worker(&self) -> Option<JoinHandle<()>> {
        self.worker
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
    }
}

impl Drop for JobScheduler {
    fn drop(&mut self) {
        self.detach();
    }
}

impl std::fmt::Debug for JobScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JobScheduler")
            .field("name", &self.name)
            .field("stats", &self.stats())
            .finish()
    }
}
