//! Bounded FIFO queue with capacity limit.

use super::{QueueError, QueueResult, TaskQueue};
use crate::core::Task;
use crossbeam::channel::{self, Receiver, Sender, TrySendError};
use std::time::Duration;

/// A bounded FIFO queue with configurable capacity.
///
/// Producers get backpressure: `put` blocks while the queue is full and
/// `try_put` returns the task inside [`QueueError::Full`].
///
/// # Example
///
/// ```rust
/// use rust_workload_generator::queue::{BoundedQueue, QueueError, TaskQueue};
/// use rust_workload_generator::{Task, TaskKind};
///
/// let queue = BoundedQueue::new(1);
/// queue.put(Task::new(TaskKind::Hash, 1)).unwrap();
///
/// match queue.try_put(Task::new(TaskKind::Hash, 2)) {
///     Err(QueueError::Full(task)) => assert_eq!(task.id(), 2),
///     _ => panic!("expected Full error"),
/// }
/// ```
pub struct BoundedQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
    capacity: usize,
}

impl BoundedQueue {
    /// Creates a new bounded queue with the specified capacity.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is 0.
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "capacity must be greater than 0");
        let (sender, receiver) = channel::bounded(capacity);
        Self {
            sender,
            receiver,
            capacity,
        }
    }
}

impl TaskQueue for BoundedQueue {
    fn put(&self, task: Task) -> QueueResult<()> {
        self.sender
            .send(task)
            .map_err(|e| QueueError::Disconnected(e.0))
    }

    fn try_put(&self, task: Task) -> QueueResult<()> {
        self.sender.try_send(task).map_err(|e| match e {
            TrySendError::Full(task) => QueueError::Full(task),
            TrySendError::Disconnected(task) => QueueError::Disconnected(task),
        })
    }

    fn take(&self, timeout: Duration) -> Option<Task> {
        self.receiver.recv_timeout(timeout).ok()
    }

    fn try_take(&self) -> Option<Task> {
        self.receiver.try_recv().ok()
    }

    fn len(&self) -> usize {
        self.receiver.len()
    }

    fn capacity(&self) -> Option<usize> {
        Some(self.capacity)
    }

    fn name(&self) -> &'static str {
        "crossbeam::channel::bounded"
    }
}
