//! # Rust Workload Generator
//!
//! A synthetic CPU workload generator built on a fixed-size worker pool.
//!
//! ## Features
//!
//! - **Worker Pool**: A bounded set of OS threads sharing one FIFO task queue
//! - **Task Queue**: Unbounded (default) or bounded queues on crossbeam channels
//! - **Metrics Store**: Per-worker, append-only result partitions on dashmap
//! - **Cooperative Shutdown**: Token-based stop with bounded latency and
//!   per-worker join timeouts
//! - **Failure Policy**: Silent worker death, or failures reported on a channel
//! - **Analysis**: Host snapshot, hash chains, sieve and Fibonacci exercises
//!
//! ## Quick Start
//!
//! ```rust
//! use rust_workload_generator::prelude::*;
//! use std::time::Duration;
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::new(
//!     WorkerPoolConfig::new().with_take_timeout(Duration::from_millis(50)),
//! )?;
//! pool.start(4)?;
//!
//! for id in 0..10 {
//!     pool.submit(Task::new(TaskKind::Math, id))?;
//! }
//! pool.metrics().wait_for_total(10, Duration::from_secs(5));
//!
//! pool.stop()?;
//! for (worker, records) in pool.metrics().snapshot() {
//!     println!("worker {}: {} results", worker, records.len());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Custom Executors
//!
//! ```rust
//! use rust_workload_generator::prelude::*;
//! use std::sync::Arc;
//!
//! struct Doubler;
//!
//! impl TaskExecutor for Doubler {
//!     fn execute(&self, task: &Task) -> Result<TaskOutput> {
//!         Ok(TaskOutput::Sum(task.id() * 2))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "Doubler"
//!     }
//! }
//!
//! # fn main() -> Result<()> {
//! let pool = WorkerPool::with_executor(WorkerPoolConfig::new(), Arc::new(Doubler))?;
//! # Ok(())
//! # }
//! ```
//!
//! ## Full Run
//!
//! ```rust,no_run
//! use rust_workload_generator::prelude::*;
//!
//! # fn main() -> Result<()> {
//! let report = Orchestrator::new(OrchestratorConfig::default())?.run()?;
//! println!("{}", report.completion_line());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analysis;
pub mod core;
pub mod metrics;
pub mod orchestrator;
pub mod pool;
pub mod prelude;
pub mod queue;
pub mod report;
pub mod system;
pub mod tracing;

pub use crate::core::{
    CancellationReason, CancellationToken, Result, Task, TaskExecutor, TaskKind, TaskOutput,
    TaskRecord, WorkloadError,
};
pub use crate::metrics::{MetricsStore, MetricsWriter};
pub use crate::orchestrator::{Orchestrator, OrchestratorConfig};
pub use crate::pool::{FailurePolicy, ShutdownSummary, WorkerPool, WorkerPoolConfig};
pub use crate::report::RunReport;
