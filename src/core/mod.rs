//! Core types and traits for the workload generator

pub mod cancellation;
pub mod error;
pub mod executor;
pub mod output;
pub mod task;

pub use cancellation::{CancellationReason, CancellationToken};
pub use error::{Result, WorkloadError};
pub use executor::{FnExecutor, SyntheticExecutor, TaskExecutor};
pub use output::{TaskOutput, TaskRecord};
pub use task::{Task, TaskKind};
