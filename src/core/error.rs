//! Error types for the workload generator

/// Result type for workload generator operations
pub type Result<T> = std::result::Result<T, WorkloadError>;

/// Errors that can occur in the workload generator
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum WorkloadError {
    /// Worker pool is already running
    #[error("Worker pool '{pool_name}' is already running with {worker_count} workers")]
    AlreadyRunning {
        /// Name of the worker pool
        pool_name: String,
        /// Number of worker threads
        worker_count: usize,
    },

    /// Worker pool was stopped and cannot be started again
    #[error("Worker pool '{pool_name}' has been stopped and cannot be restarted")]
    PoolStopped {
        /// Name of the worker pool
        pool_name: String,
    },

    /// Failed to spawn a worker thread
    #[error("Failed to spawn worker thread #{worker_id}: {message}")]
    SpawnError {
        /// Identity of the worker that failed to spawn
        worker_id: usize,
        /// Error message
        message: String,
        /// Source IO error
        #[source]
        source: Option<std::io::Error>,
    },

    /// Invalid configuration with parameter
    #[error("Invalid configuration for '{parameter}': {message}")]
    InvalidConfig {
        /// Configuration parameter name
        parameter: String,
        /// Error message
        message: String,
    },

    /// Bounded queue is at capacity
    #[error("Task queue is full: {current}/{max} tasks queued")]
    QueueFull {
        /// Current queue size
        current: usize,
        /// Maximum queue size
        max: usize,
    },

    /// Queue lost its receiving side
    #[error("Task queue is disconnected")]
    QueueDisconnected,

    /// A task body failed
    #[error("Task {task_id} ({kind}) failed: {message}")]
    TaskFailed {
        /// Identifier of the failed task
        task_id: u64,
        /// Kind name of the failed task
        kind: String,
        /// Error message
        message: String,
    },

    /// Operation observed a cancelled token
    #[error("Operation cancelled: {reason}")]
    Cancelled {
        /// Reason for cancellation
        reason: String,
    },

    /// Report serialization failed
    #[error("Failed to serialize report: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl WorkloadError {
    /// Create an already running error
    pub fn already_running(pool_name: impl Into<String>, worker_count: usize) -> Self {
        WorkloadError::AlreadyRunning {
            pool_name: pool_name.into(),
            worker_count,
        }
    }

    /// Create a pool stopped error
    pub fn pool_stopped(pool_name: impl Into<String>) -> Self {
        WorkloadError::PoolStopped {
            pool_name: pool_name.into(),
        }
    }

    /// Create a spawn error with source
    pub fn spawn_with_source(
        worker_id: usize,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        WorkloadError::SpawnError {
            worker_id,
            message: message.into(),
            source: Some(source),
        }
    }

    /// Create an invalid config error
    pub fn invalid_config(parameter: impl Into<String>, message: impl Into<String>) -> Self {
        WorkloadError::InvalidConfig {
            parameter: parameter.into(),
            message: message.into(),
        }
    }

    /// Create a queue full error
    pub fn queue_full(current: usize, max: usize) -> Self {
        WorkloadError::QueueFull { current, max }
    }

    /// Create a task failure error
    pub fn task_failed(task_id: u64, kind: impl Into<String>, message: impl Into<String>) -> Self {
        WorkloadError::TaskFailed {
            task_id,
            kind: kind.into(),
            message: message.into(),
        }
    }

    /// Create a cancelled error
    pub fn cancelled(reason: impl Into<String>) -> Self {
        WorkloadError::Cancelled {
            reason: reason.into(),
        }
    }
}
