//! Priority ordering for queued jobs
//!
//! Jobs are dequeued by ascending priority value, with submission order
//! breaking ties (FIFO within the same priority).

use crate::job::{Job, JobId};
use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::fmt;

/// Job priority
///
/// Smaller values are more urgent and run first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct JobPriority(pub u32);

impl JobPriority {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn value(self) -> u32 {
        self.0
    }

    /// Whether a job with this priority should be dequeued before `other`
    pub fn runs_before(self, other: JobPriority) -> bool {
        self.0 < other.0
    }
}

impl fmt::Display for JobPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A job waiting in the queue
pub(crate) struct QueuedJob {
    pub(crate) job: Box<dyn Job>,
    pub(crate) priority: JobPriority,
    /// Submission order, kept across preemption so a resumed job keeps its place
    pub(crate) insertion_order: u64,
}

impl PartialEq for QueuedJob {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for QueuedJob {}

impl PartialOrd for QueuedJob {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for QueuedJob {
    fn cmp(&self, other: &Self) -> Ordering {
        // BinaryHeap is a max heap: the smallest priority value and the
        // earliest submission must compare greatest.
        other
            .priority
            .cmp(&self.priority)
            .then_with(|| other.insertion_order.cmp(&self.insertion_order))
    }
}

/// Lightweight description of a queued job, for inspection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingJob {
    pub id: JobId,
    pub factory_name: &'static str,
    pub priority: JobPriority,
}

/// Priority queue of boxed jobs
///
/// Not synchronized on its own; the scheduler keeps it behind its state lock.
pub(crate) struct PriorityQueue {
    heap: BinaryHeap<QueuedJob>,
    insertion_counter: u64,
}

impl PriorityQueue {
    pub(crate) fn new() -> Self {
        Self {
            heap: BinaryHeap::new(),
            insertion_counter: 0,
        }
    }

    /// Queue a newly submitted job
    pub(crate) fn push(&mut self, job: Box<dyn Job>) {
        let insertion_order = self.insertion_counter;
        self.insertion_counter += 1;
        let priority = job.priority();
        self.heap.push(QueuedJob {
            job,
            priority,
            insertion_order,
        });
    }

    /// Put a preempted job back with its original submission order
    pub(crate) fn requeue(&mut self, queued: QueuedJob) {
        self.heap.push(queued);
    }

    pub(crate) fn pop(&mut self) -> Option<QueuedJob> {
        self.heap.pop()
    }

    pub(crate) fn len(&self) -> usize {
        self.heap.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    /// Drop every queued job, returning how many were dropped
    pub(crate) fn clear(&mut self) -> usize {
        let removed = self.heap.len();
        self.heap.clear();
        removed
    }

    /// Remove all jobs matching a predicate, returning how many were removed
    pub(crate) fn remove_if<F>(&mut self, predicate: F) -> usize
    where
        F: Fn(&dyn Job) -> bool,
    {
        let original_len = self.heap.len();
        let remaining: Vec<QueuedJob> = std::mem::take(&mut self.heap)
            .into_iter()
            .filter(|queued| !predicate(queued.job.as_ref()))
            .collect();
        self.heap = remaining.into_iter().collect();
        original_len - self.heap.len()
    }

    /// Queued jobs in the order they would run
    pub(crate) fn pending(&self) -> Vec<PendingJob> {
        let mut queued: Vec<&QueuedJob> = self.heap.iter().collect();
        queued.sort_by(|a, b| b.cmp(a));
        queued
            .into_iter()
            .map(|q| PendingJob {
                id: q.job.id(),
                factory_name: q.job.factory_name(),
                priority: q.priority,
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::NoopJob;

    fn pop_id(queue: &mut PriorityQueue) -> JobId {
        queue.pop().map(|q| q.job.id()).unwrap()
    }

    #[test]
    fn test_priority_ordering() {
        assert!(JobPriority(100).runs_before(JobPriority(500)));
        assert!(!JobPriority(500).runs_before(JobPriority(100)));
        assert!(!JobPriority(100).runs_before(JobPriority(100)));
    }

    #[test]
    fn test_queue_basic() {
        let mut queue = PriorityQueue::new();
        assert!(queue.is_empty());

        queue.push(NoopJob::boxed(1, 500));
        assert_eq!(queue.len(), 1);

        assert_eq!(pop_id(&mut queue), 1);
        assert!(queue.pop().is_none());
    }

    #[test]
    fn test_lower_value_first_with_fifo_tie_break() {
        let mut queue = PriorityQueue::new();
        queue.push(NoopJob::boxed(1, 500));
        queue.push(NoopJob::boxed(2, 100));
        queue.push(NoopJob::boxed(3, 100));

        assert_eq!(pop_id(&mut queue), 2);
        assert_eq!(pop_id(&mut queue), 3);
        assert_eq!(pop_id(&mut queue), 1);
    }

    #[test]
    fn test_requeue_keeps_submission_order() {
        let mut queue = PriorityQueue::new();
        queue.push(NoopJob::boxed(1, 100));
        queue.push(NoopJob::boxed(2, 100));

        let first = queue.pop().unwrap();
        queue.push(NoopJob::boxed(3, 100));
        queue.requeue(first);

        assert_eq!(pop_id(&mut queue), 1);
        assert_eq!(pop_id(&mut queue), 2);
        assert_eq!(pop_id(&mut queue), 3);
    }

    #[test]
    fn test_remove_if() {
        let mut queue = PriorityQueue::new();
        queue.push(NoopJob::boxed_from("PageImgLoader", 1, 500));
        queue.push(NoopJob::boxed_from("PageBoxesLoader", 1, 100));
        queue.push(NoopJob::boxed_from("PageImgLoader", 2, 500));

        let removed = queue.remove_if(|job| job.factory_name() == "PageImgLoader");
        assert_eq!(removed, 2);
        assert_eq!(queue.len(), 1);
        assert_eq!(queue.pop().unwrap().job.factory_name(), "PageBoxesLoader");
    }

    #[test]
    fn test_pending_is_in_run_order() {
        let mut queue = PriorityQueue::new();
        queue.push(NoopJob::boxed(1, 500));
        queue.push(NoopJob::boxed(2, 100));
        queue.push(NoopJob::boxed(3, 300));

        let ids: Vec<JobId> = queue.pending().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![2, 3, 1]);
        // Inspection does not consume
        assert_eq!(queue.len(), 3);
    }

    #[test]
    fn test_clear() {
        let mut queue = PriorityQueue::new();
        queue.push(NoopJob::boxed(1, 500));
        queue.push(NoopJob::boxed(2, 100));

        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }
}
