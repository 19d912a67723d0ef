//! Jobs used by the scheduler's unit tests

use crate::{CancellationToken, Job, JobId, JobPriority};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const TIMEOUT: Duration = Duration::from_secs(5);

pub(crate) struct NoopJob {
    id: JobId,
    factory: &'static str,
    priority: JobPriority,
}

impl NoopJob {
    pub(crate) fn boxed(id: JobId, priority: u32) -> Box<dyn Job> {
        Self::boxed_from("Noop", id, priority)
    }

    pub(crate) fn boxed_from(factory: &'static str, id: JobId, priority: u32) -> Box<dyn Job> {
        Box::new(Self {
            id,
            factory,
            priority: JobPriority(priority),
        })
    }
}

impl Job for NoopJob {
    fn id(&self) -> JobId {
        self.id
    }

    fn factory_name(&self) -> &'static str {
        self.factory
    }

    fn priority(&self) -> JobPriority {
        self.priority
    }

    fn run(&mut self, _token: &CancellationToken) {}
}

enum Behavior {
    Record,
    Panic,
    Block {
        started: Sender<()>,
        release: Receiver<()>,
    },
    StopOnFirstRun {
        started: Sender<()>,
        runs: Arc<AtomicUsize>,
    },
}

/// Appends its id to a shared log when it completes
pub(crate) struct RecordingJob {
    id: JobId,
    priority: JobPriority,
    log: Arc<Mutex<Vec<JobId>>>,
    behavior: Behavior,
}

impl RecordingJob {
    pub(crate) fn boxed(id: JobId, priority: u32, log: &Arc<Mutex<Vec<JobId>>>) -> Box<dyn Job> {
        Box::new(Self {
            id,
            priority: JobPriority(priority),
            log: log.clone(),
            behavior: Behavior::Record,
        })
    }

    pub(crate) fn panicking(id: JobId, priority: u32) -> Box<dyn Job> {
        Box::new(Self {
            id,
            priority: JobPriority(priority),
            log: Arc::default(),
            behavior: Behavior::Panic,
        })
    }

    /// Blocks until the returned sender fires
    pub(crate) fn blocking(
        id: JobId,
        priority: u32,
        log: &Arc<Mutex<Vec<JobId>>>,
    ) -> (Box<dyn Job>, Receiver<()>, Sender<()>) {
        let (started_tx, started_rx) = bounded(1);
        let (release_tx, release_rx) = bounded(1);
        let job = Box::new(Self {
            id,
            priority: JobPriority(priority),
            log: log.clone(),
            behavior: Behavior::Block {
                started: started_tx,
                release: release_rx,
            },
        });
        (job, started_rx, release_tx)
    }

    /// Stoppable job that waits for a stop request on its first run and
    /// completes on the next one
    pub(crate) fn stoppable(
        id: JobId,
        priority: u32,
        log: &Arc<Mutex<Vec<JobId>>>,
        runs: &Arc<AtomicUsize>,
    ) -> (Box<dyn Job>, Receiver<()>) {
        let (started_tx, started_rx) = bounded(1);
        let job = Box::new(Self {
            id,
            priority: JobPriority(priority),
            log: log.clone(),
            behavior: Behavior::StopOnFirstRun {
                started: started_tx,
                runs: runs.clone(),
            },
        });
        (job, started_rx)
    }
}

impl Job for RecordingJob {
    fn id(&self) -> JobId {
        self.id
    }

    fn factory_name(&self) -> &'static str {
        "Recording"
    }

    fn priority(&self) -> JobPriority {
        self.priority
    }

    fn can_stop(&self) -> bool {
        matches!(self.behavior, Behavior::StopOnFirstRun { .. })
    }

    fn run(&mut self, token: &CancellationToken) {
        match &self.behavior {
            Behavior::Record => {}
            Behavior::Panic => panic!("job {} failed", self.id),
            Behavior::Block { started, release } => {
                let _ = started.send(());
                let _ = release.recv_timeout(TIMEOUT);
            }
            Behavior::StopOnFirstRun { started, runs } => {
                if runs.fetch_add(1, Ordering::SeqCst) == 0 {
                    let _ = started.send(());
                    let deadline = Instant::now() + TIMEOUT;
                    while !token.is_cancelled() && Instant::now() < deadline {
                        thread::sleep(Duration::from_millis(1));
                    }
                    return;
                }
            }
        }
        self.log.lock().unwrap().push(self.id);
    }
}
