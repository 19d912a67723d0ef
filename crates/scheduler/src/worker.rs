//! Worker thread loop for a [`JobScheduler`](crate::JobScheduler).
//!
//! The worker pulls the most urgent job, runs it outside the state lock,
//! and records the outcome. Panics are caught per job so one faulty load
//! never takes the scheduler down.

use crate::cancel::CancellationToken;
use crate::scheduler::{ActiveJob, Shared};
use std::io;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Spawn the named worker thread.
pub(crate) fn spawn(
    thread_name: String,
    scheduler_name: String,
    shared: Arc<Shared>,
    poll_interval: Duration,
) -> io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(thread_name)
        .spawn(move || run(&scheduler_name, &shared, poll_interval))
}

/// Main worker loop.
///
/// Waits on the queue condvar (waking every `poll_interval` to re-check
/// for shutdown), runs one job at a time, and exits once the scheduler is
/// stopped.
fn run(name: &str, shared: &Shared, poll_interval: Duration) {
    loop {
        let (mut queued, token) = {
            let mut state = shared.lock();
            let queued = loop {
                if state.stopped {
                    tracing::debug!(scheduler = name, "worker exiting");
                    return;
                }
                if let Some(queued) = state.queue.pop() {
                    break queued;
                }
                state = shared
                    .work_available
                    .wait_timeout(state, poll_interval)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            };

            let token = CancellationToken::new();
            state.active = Some(ActiveJob {
                id: queued.job.id(),
                factory_name: queued.job.factory_name(),
                priority: queued.priority,
                can_stop: queued.job.can_stop(),
                token: token.clone(),
            });
            (queued, token)
        };

        let job_id = queued.job.id();
        let factory = queued.job.factory_name();
        tracing::debug!(scheduler = name, job_id, factory, "job running");

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| queued.job.run(&token)));

        let mut state = shared.lock();
        state.active = None;
        match outcome {
            Ok(()) if token.will_resume() && !state.stopped => {
                tracing::debug!(scheduler = name, job_id, factory, "job stopped, re-queued");
                state.stats.jobs_preempted += 1;
                state.queue.requeue(queued);
            }
            Ok(()) if token.is_cancelled() => {
                tracing::debug!(scheduler = name, job_id, factory, "job cancelled while running");
                state.stats.jobs_cancelled += 1;
            }
            Ok(()) => {
                state.stats.jobs_completed += 1;
            }
            Err(payload) => {
                let reason = payload
                    .downcast_ref::<&str>()
                    .map(|s| s.to_string())
                    .or_else(|| payload.downcast_ref::<String>().cloned())
                    .unwrap_or_else(|| "unknown panic".to_string());
                tracing::error!(scheduler = name, job_id, factory, %reason, "job panicked");
                state.stats.jobs_panicked += 1;
            }
        }
        drop(state);
        shared.job_finished.notify_all();
    }
}
