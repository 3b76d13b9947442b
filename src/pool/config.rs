//! Worker pool configuration

use crate::core::{Result, WorkloadError};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// What a worker does when a task body fails or panics
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// The worker stops looping and the pool is not told. Panics unwind the
    /// worker thread. The pool keeps running with one worker fewer.
    #[default]
    Silent,
    /// Errors and panics are caught, sent to the pool's failure channel, and
    /// the worker moves on to the next task.
    Report,
}

/// Configuration for a [`WorkerPool`](crate::pool::WorkerPool)
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WorkerPoolConfig {
    /// Thread name prefix; workers are named `{prefix}-{id}`
    pub thread_name_prefix: String,
    /// Ceiling applied to the requested worker count
    pub parallelism_limit: usize,
    /// How long a worker waits on an empty queue before re-checking for
    /// cancellation. Bounds per-worker shutdown latency.
    pub take_timeout: Duration,
    /// How long `stop` waits for each worker before detaching it
    pub join_timeout: Duration,
    /// Queue capacity (`None` = unbounded)
    pub queue_capacity: Option<usize>,
    /// Reaction to failing task bodies
    pub failure_policy: FailurePolicy,
    /// Number of undrained failure reports kept under
    /// [`FailurePolicy::Report`]; further reports are dropped
    pub failure_channel_capacity: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            thread_name_prefix: "worker".to_string(),
            parallelism_limit: num_cpus::get(),
            take_timeout: Duration::from_secs(1),
            join_timeout: Duration::from_secs(1),
            queue_capacity: None,
            failure_policy: FailurePolicy::default(),
            failure_channel_capacity: 1024,
        }
    }
}

impl WorkerPoolConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set thread name prefix
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.thread_name_prefix = prefix.into();
        self
    }

    /// Override the parallelism ceiling (defaults to the number of CPUs)
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_parallelism_limit(mut self, limit: usize) -> Self {
        self.parallelism_limit = limit;
        self
    }

    /// Set the queue wait used between cancellation checks.
    ///
    /// - **Shorter** timeouts: faster shutdown, more idle wakeups
    /// - **Longer** timeouts: fewer wakeups, slower shutdown
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_take_timeout(mut self, timeout: Duration) -> Self {
        self.take_timeout = timeout;
        self
    }

    /// Set the per-worker join timeout used by `stop`
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_join_timeout(mut self, timeout: Duration) -> Self {
        self.join_timeout = timeout;
        self
    }

    /// Use a bounded queue of the given capacity
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = Some(capacity);
        self
    }

    /// Set the failure policy
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_failure_policy(mut self, policy: FailurePolicy) -> Self {
        self.failure_policy = policy;
        self
    }

    /// Set how many failure reports are kept until drained
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_failure_channel_capacity(mut self, capacity: usize) -> Self {
        self.failure_channel_capacity = capacity;
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.parallelism_limit == 0 {
            return Err(WorkloadError::invalid_config(
                "parallelism_limit",
                "Parallelism limit must be greater than 0",
            ));
        }
        if self.take_timeout.is_zero() {
            return Err(WorkloadError::invalid_config(
                "take_timeout",
                "Take timeout must be non-zero",
            ));
        }
        if self.join_timeout.is_zero() {
            return Err(WorkloadError::invalid_config(
                "join_timeout",
                "Join timeout must be non-zero",
            ));
        }
        if self.queue_capacity == Some(0) {
            return Err(WorkloadError::invalid_config(
                "queue_capacity",
                "Bounded queue capacity must be greater than 0",
            ));
        }
        if self.failure_channel_capacity == 0 {
            return Err(WorkloadError::invalid_config(
                "failure_channel_capacity",
                "Failure channel capacity must be greater than 0",
            ));
        }
        Ok(())
    }
}
