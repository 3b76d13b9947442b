//! Task queue abstraction and its crossbeam-backed implementations.
//!
//! The [`TaskQueue`] trait is what workers and the pool see. Two
//! implementations are provided:
//!
//! - [`ChannelQueue`]: unbounded FIFO over a crossbeam channel (default).
//!   `put` never blocks.
//! - [`BoundedQueue`]: FIFO with a fixed capacity. `put` blocks while the
//!   queue is full and `try_put` hands the task back.
//!
//! Both guarantee FIFO order and atomic dequeue: a task is handed to exactly
//! one taker.
//!
//! ```rust
//! use rust_workload_generator::queue::{ChannelQueue, TaskQueue};
//! use rust_workload_generator::{Task, TaskKind};
//! use std::time::Duration;
//!
//! let queue = ChannelQueue::unbounded();
//! queue.put(Task::new(TaskKind::Hash, 1)).unwrap();
//! assert_eq!(queue.take(Duration::from_millis(10)).map(|t| t.id()), Some(1));
//! assert!(queue.take(Duration::from_millis(10)).is_none());
//! ```

mod bounded;
mod channel;

pub use bounded::BoundedQueue;
pub use channel::ChannelQueue;

use crate::core::Task;
use std::time::Duration;

/// Errors that can occur while enqueueing. The rejected task is handed back.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    /// Queue is full (bounded queues only)
    #[error("queue is full")]
    Full(Task),
    /// Receiving side is gone
    #[error("queue is disconnected")]
    Disconnected(Task),
}

impl QueueError {
    /// Recover the task that could not be enqueued
    pub fn into_task(self) -> Task {
        match self {
            QueueError::Full(task) | QueueError::Disconnected(task) => task,
        }
    }
}

/// Result type for queue operations.
pub type QueueResult<T> = std::result::Result<T, QueueError>;

/// A thread-safe FIFO buffer of tasks shared by producers and workers.
///
/// # Thread Safety
///
/// Implementations must be `Send + Sync`; the pool shares one instance
/// between the orchestrator and every worker.
pub trait TaskQueue: Send + Sync {
    /// Appends a task at the tail.
    ///
    /// Unbounded queues never block here. Bounded queues block until space
    /// is available.
    ///
    /// # Errors
    ///
    /// Returns [`QueueError::Disconnected`] if the receiving side is gone.
    fn put(&self, task: Task) -> QueueResult<()>;

    /// Appends a task without blocking.
    ///
    /// # Errors
    ///
    /// - [`QueueError::Full`] if the queue is at capacity
    /// - [`QueueError::Disconnected`] if the receiving side is gone
    fn try_put(&self, task: Task) -> QueueResult<()>;

    /// Removes the head task, waiting up to `timeout` for one to arrive.
    ///
    /// Returns `None` when nothing arrived in time. This is the expected
    /// idle outcome, not an error.
    fn take(&self, timeout: Duration) -> Option<Task>;

    /// Removes the head task if one is immediately available.
    fn try_take(&self) -> Option<Task>;

    /// Number of queued tasks.
    fn len(&self) -> usize;

    /// Returns `true` if no task is queued.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum capacity, `None` for unbounded queues.
    fn capacity(&self) -> Option<usize>;

    /// Implementation name for logging.
    fn name(&self) -> &'static str;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::TaskKind;

    #[test]
    fn test_queue_error_display() {
        let task = Task::new(TaskKind::Hash, 1);
        assert_eq!(QueueError::Full(task.clone()).to_string(), "queue is full");
        assert_eq!(
            QueueError::Disconnected(task).to_string(),
            "queue is disconnected"
        );
    }

    #[test]
    fn test_queue_error_returns_task() {
        let task = Task::new(TaskKind::Sort, 77);
        let err = QueueError::Full(task.clone());
        assert_eq!(err.into_task(), task);
    }

    #[test]
    fn test_trait_object_dispatch() {
        let queues: Vec<Box<dyn TaskQueue>> = vec![
            Box::new(ChannelQueue::unbounded()),
            Box::new(BoundedQueue::new(4)),
        ];
        for queue in &queues {
            assert!(queue.is_empty());
            queue.put(Task::new(TaskKind::Math, 1)).unwrap();
            assert_eq!(queue.len(), 1);
            assert_eq!(queue.try_take().map(|t| t.id()), Some(1));
        }
        assert_eq!(queues[0].capacity(), None);
        assert_eq!(queues[1].capacity(), Some(4));
    }
}
