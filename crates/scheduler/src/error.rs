//! Scheduler error types

use thiserror::Error;

/// Errors raised by [`JobScheduler`](crate::JobScheduler)
#[derive(Debug, Error)]
pub enum SchedulerError {
    #[error("Scheduler '{0}' has been stopped")]
    Stopped(String),

    #[error("Scheduler '{name}' is already running")]
    AlreadyRunning { name: String },

    #[error("Failed to spawn worker thread for scheduler '{name}': {source}")]
    Spawn {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

pub type SchedulerResult<T> = Result<T, SchedulerError>;
