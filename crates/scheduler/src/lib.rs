//! Page View Scheduler Library
//!
//! Priority job schedulers for loading page content off the UI thread.
//!
//! Each [`JobScheduler`] owns a priority queue and a single worker thread:
//! jobs of one kind run one at a time, smallest priority value first, FIFO
//! among equal priorities. Different kinds (page images, page boxes) use
//! separate schedulers and so run concurrently.
//!
//! Jobs report their lifecycle through [`JobEvents`] (start, progress with a
//! payload, done). Listeners run on the worker, so results destined for the
//! UI are posted through an [`IdleSender`] and applied later by whoever owns
//! the matching [`IdleQueue`].
//!
//! # Example
//!
//! ```
//! use pageview_scheduler::{
//!     CancellationToken, IdleQueue, Job, JobEvents, JobFactory, JobId, JobPriority, JobScheduler,
//! };
//! use std::time::Duration;
//!
//! struct Square {
//!     id: JobId,
//!     value: u64,
//!     events: JobEvents<u64>,
//! }
//!
//! impl Job for Square {
//!     fn id(&self) -> JobId { self.id }
//!     fn factory_name(&self) -> &'static str { "Square" }
//!     fn priority(&self) -> JobPriority { JobPriority::new(100) }
//!     fn run(&mut self, _token: &CancellationToken) {
//!         let value = self.value;
//!         self.events.run_guarded(self.id, || Ok::<_, String>(value * value));
//!     }
//! }
//!
//! let factory = JobFactory::new("Square");
//! let idle: IdleQueue<Vec<u64>> = IdleQueue::new();
//! let scheduler = JobScheduler::new("squares");
//! scheduler.start().unwrap();
//!
//! let mut job = Square { id: factory.next_id(), value: 7, events: JobEvents::new() };
//! let sender = idle.sender();
//! job.events.connect_progress(move |_, result| {
//!     sender.add(move |results| results.push(result));
//! });
//! scheduler.schedule(Box::new(job)).unwrap();
//! assert!(scheduler.wait_idle(Duration::from_secs(5)));
//!
//! let mut results = Vec::new();
//! idle.run_pending(&mut results);
//! assert_eq!(results, vec![49]);
//! ```

mod cancel;
mod error;
mod idle;
mod job;
mod priority;
mod scheduler;
mod worker;

#[cfg(test)]
mod test_support;

// Re-export public API
pub use cancel::CancellationToken;
pub use error::{SchedulerError, SchedulerResult};
pub use idle::{IdleQueue, IdleSender, IdleTask};
pub use job::{Job, JobEvents, JobFactory, JobId};
pub use priority::{JobPriority, PendingJob};
pub use scheduler::{JobScheduler, SchedulerConfig, SchedulerStats};
