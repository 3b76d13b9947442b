//! Worker pool and worker implementations

pub mod config;
pub mod worker;
pub mod worker_pool;

pub use config::{FailurePolicy, WorkerPoolConfig};
pub use worker::{FailureCause, JoinOutcome, Worker, WorkerFailure, WorkerState, WorkerStateCell};
pub use worker_pool::{PoolState, ShutdownSummary, WorkerPool};
