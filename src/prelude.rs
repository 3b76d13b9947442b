//! Convenient re-exports for common types and traits

pub use crate::core::{
    CancellationToken, FnExecutor, Result, SyntheticExecutor, Task, TaskExecutor, TaskKind,
    TaskOutput, TaskRecord, WorkloadError,
};
pub use crate::metrics::MetricsStore;
pub use crate::orchestrator::{Orchestrator, OrchestratorConfig};
pub use crate::pool::{
    FailurePolicy, ShutdownSummary, WorkerFailure, WorkerPool, WorkerPoolConfig, WorkerState,
};
pub use crate::queue::TaskQueue;
pub use crate::report::RunReport;
