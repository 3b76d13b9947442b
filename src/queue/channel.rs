//! Unbounded FIFO queue using crossbeam channels.

use super::{QueueError, QueueResult, TaskQueue};
use crate::core::Task;
use crossbeam::channel::{self, Receiver, Sender};
use std::time::Duration;

/// An unbounded FIFO queue using crossbeam channels.
///
/// This is the default queue. The queue owns both channel ends, so it never
/// disconnects while alive and `put` always succeeds.
pub struct ChannelQueue {
    sender: Sender<Task>,
    receiver: Receiver<Task>,
}

impl ChannelQueue {
    /// Creates a new unbounded channel queue.
    pub fn unbounded() -> Self {
        let (sender, receiver) = channel::unbounded();
        Self { sender, receiver }
    }
}

impl Default for ChannelQueue {
    fn default() -> Self {
        Self::unbounded()
    }
}

impl TaskQueue for ChannelQueue {
    fn put(&self, task: Task) -> QueueResult<()> {
        self.sender
            .send(task)
            .map_err(|e| QueueError::Disconnected(e.0))
    }

    fn try_put(&self, task: Task) -> QueueResult<()> {
        self.put(task)
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
        None
    }

    fn name(&self) -> &'static str {
        "crossbeam::channel::unbounded"
    }
}
