//! Cross-thread task queue into the single-threaded UI context
//!
//! Job events fire on worker threads. Anything that must touch UI-owned
//! state is posted here as a task and run later, in FIFO order, by the
//! thread that owns the context (typically from the event loop's idle
//! handler).

use crossbeam_channel::{unbounded, Receiver, Sender};

/// A task run against the UI context `C`
pub type IdleTask<C> = Box<dyn FnOnce(&mut C) + Send>;

/// Receiving end, owned by the UI context
///
/// # Example
///
/// ```
/// use pageview_scheduler::IdleQueue;
///
/// let queue: IdleQueue<Vec<u32>> = IdleQueue::new();
/// let sender = queue.sender();
///
/// std::thread::spawn(move || {
///     sender.add(|ctx| ctx.push(1));
///     sender.add(|ctx| ctx.push(2));
/// })
/// .join()
/// .unwrap();
///
/// let mut ctx = Vec::new();
/// assert_eq!(queue.run_pending(&mut ctx), 2);
/// assert_eq!(ctx, vec![1, 2]);
/// ```
pub struct IdleQueue<C> {
    sender: Sender<IdleTask<C>>,
    receiver: Receiver<IdleTask<C>>,
}

impl<C> IdleQueue<C> {
    pub fn new() -> Self {
        let (sender, receiver) = unbounded();
        Self { sender, receiver }
    }

    /// A sender that worker threads can use to post tasks
    pub fn sender(&self) -> IdleSender<C> {
        IdleSender {
            sender: self.sender.clone(),
        }
    }

    /// Number of tasks waiting
    pub fn len(&self) -> usize {
        self.receiver.len()
    }

    pub fn is_empty(&self) -> bool {
        self.receiver.is_empty()
    }

    /// Take every task posted so far, in posting order, without running them.
    ///
    /// Useful when the context that runs the tasks also owns this queue.
    pub fn take_pending(&self) -> Vec<IdleTask<C>> {
        self.receiver.try_iter().collect()
    }

    /// Run every task posted so far against `ctx`. Returns the number run.
    ///
    /// Tasks posted while draining are left for the next call.
    pub fn run_pending(&self, ctx: &mut C) -> usize {
        let tasks = self.take_pending();
        let count = tasks.len();
        for task in tasks {
            task(ctx);
        }
        count
    }
}

impl<C> Default for IdleQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}

/// Posting end of an [`IdleQueue`], cheap to clone and `Send`
pub struct IdleSender<C> {
    sender: Sender<IdleTask<C>>,
}

impl<C> IdleSender<C> {
    /// Post a task to run on the UI context.
    ///
    /// Returns `false` if the queue has been dropped (the view is gone); the
    /// task is discarded in that case.
    pub fn add<F>(&self, task: F) -> bool
    where
        F: FnOnce(&mut C) + Send + 'static,
    {
        if self.sender.send(Box::new(task)).is_err() {
            tracing::debug!("idle queue closed, dropping task");
            return false;
        }
        true
    }
}

impl<C> Clone for IdleSender<C> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    #[test]
    fn test_tasks_run_in_fifo_order() {
        let queue: IdleQueue<Vec<u32>> = IdleQueue::new();
        let sender = queue.sender();
        for i in 0..5 {
            sender.add(move |ctx| ctx.push(i));
        }
        assert_eq!(queue.len(), 5);

        let mut ctx = Vec::new();
        assert_eq!(queue.run_pending(&mut ctx), 5);
        assert_eq!(ctx, vec![0, 1, 2, 3, 4]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_tasks_from_many_threads_are_all_delivered() {
        let queue: IdleQueue<Vec<u32>> = IdleQueue::new();
        let handles: Vec<_> = (0..4)
            .map(|t| {
                let sender = queue.sender();
                thread::spawn(move || {
                    for i in 0..10 {
                        sender.add(move |ctx| ctx.push(t * 100 + i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        let mut ctx = Vec::new();
        queue.run_pending(&mut ctx);
        assert_eq!(ctx.len(), 40);

        // Per-thread order is preserved
        for t in 0..4 {
            let from_thread: Vec<u32> = ctx.iter().copied().filter(|v| v / 100 == t).collect();
            let expected: Vec<u32> = (0..10).map(|i| t * 100 + i).collect();
            assert_eq!(from_thread, expected);
        }
    }

    #[test]
    fn test_add_after_queue_dropped() {
        let queue: IdleQueue<()> = IdleQueue::new();
        let sender = queue.sender();
        drop(queue);

        assert!(!sender.add(|_| {}));
    }

    #[test]
    fn test_take_pending_does_not_run() {
        let queue: IdleQueue<u32> = IdleQueue::new();
        queue.sender().add(|ctx| *ctx += 1);

        let tasks = queue.take_pending();
        assert_eq!(tasks.len(), 1);

        let mut ctx = 0;
        for task in tasks {
            task(&mut ctx);
        }
        assert_eq!(ctx, 1);
    }
}
