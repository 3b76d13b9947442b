//! Tracing integration for observability.
//!
//! With the `tracing` feature enabled, worker loops and task bodies run
//! inside spans and the pool emits structured events through [`events`].
//! Without it, [`TracedExecutor`] is a transparent wrapper.
//!
//! # Example
//!
//! ```rust,ignore
//! use rust_workload_generator::prelude::*;
//! use rust_workload_generator::tracing::TracedExecutor;
//! use std::sync::Arc;
//!
//! let span = tracing::info_span!("run", batch = 100);
//! let _enter = span.enter();
//!
//! // Every task body runs inside `run`, whichever worker picks it up
//! let executor = Arc::new(TracedExecutor::new(SyntheticExecutor::new()));
//! let pool = WorkerPool::with_executor(WorkerPoolConfig::new(), executor)?;
//! ```

use crate::core::{Result, Task, TaskExecutor, TaskOutput};

/// An executor wrapper that carries a tracing span across thread boundaries.
///
/// The span current at construction time is entered around every task the
/// wrapped executor runs, so task events stay attached to the caller's
/// context even though they execute on worker threads.
pub struct TracedExecutor<E: TaskExecutor> {
    inner: E,
    #[cfg(feature = "tracing")]
    span: ::tracing::Span,
}

impl<E: TaskExecutor> TracedExecutor<E> {
    /// Wrap `inner`, capturing the current span.
    pub fn new(inner: E) -> Self {
        Self {
            inner,
            #[cfg(feature = "tracing")]
            span: ::tracing::Span::current(),
        }
    }

    /// Wrap `inner` with a specific span.
    #[cfg(feature = "tracing")]
    pub fn with_span(inner: E, span: ::tracing::Span) -> Self {
        Self { inner, span }
    }

    /// The wrapped executor
    pub fn inner(&self) -> &E {
        &self.inner
    }
}

impl<E: TaskExecutor> TaskExecutor for TracedExecutor<E> {
    fn execute(&self, task: &Task) -> Result<TaskOutput> {
        #[cfg(feature = "tracing")]
        let _guard = self.span.enter();
        self.inner.execute(task)
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Structured events emitted by workers and the pool.
///
/// Field names follow the `counter.` / `histogram.` / `gauge.` prefixes
/// understood by tracing-to-metrics bridges.
#[cfg(feature = "tracing")]
pub mod events {
    use crate::core::TaskKind;
    use crate::pool::FailureCause;
    use std::time::Duration;

    /// Records a recorded task result.
    #[inline]
    pub fn record_task_completed(worker_id: usize, kind: TaskKind, elapsed: Duration) {
        ::tracing::trace!(
            counter.tasks_completed = 1,
            histogram.task_duration_us = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX),
            worker_id = worker_id,
            kind = kind.as_str(),
            "task completed"
        );
    }

    /// Records a failed or panicked task body.
    #[inline]
    pub fn record_task_failed(worker_id: usize, kind: TaskKind, cause: &FailureCause) {
        ::tracing::debug!(
            counter.tasks_failed = 1,
            worker_id = worker_id,
            kind = kind.as_str(),
            cause = %cause,
            "task failed"
        );
    }

    /// Records a worker leaving its loop.
    #[inline]
    pub fn record_worker_exit(worker_id: usize, processed: u64) {
        ::tracing::debug!(worker_id = worker_id, processed = processed, "worker exited");
    }

    /// Records pool startup.
    #[inline]
    pub fn record_pool_start(workers: usize, queue_type: &str) {
        ::tracing::info!(
            workers = workers,
            queue_type = queue_type,
            "worker pool started"
        );
    }

    /// Records pool shutdown.
    #[inline]
    pub fn record_pool_stop(joined: usize, detached: usize, left_queued: usize) {
        ::tracing::info!(
            joined = joined,
            detached = detached,
            left_queued = left_queued,
            "worker pool stopped"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FnExecutor, SyntheticExecutor, TaskKind};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_traced_executor_executes() {
        let executed = Arc::new(AtomicBool::new(false));
        let executed_clone = Arc::clone(&executed);

        let traced = TracedExecutor::new(FnExecutor::new(move |task: &Task| {
            executed_clone.store(true, Ordering::SeqCst);
            Ok(TaskOutput::Sum(task.id()))
        }));

        let output = traced
            .execute(&Task::new(TaskKind::Math, 7))
            .expect("Task should execute");
        assert_eq!(output, TaskOutput::Sum(7));
        assert!(executed.load(Ordering::SeqCst));
    }

    #[test]
    fn test_traced_executor_preserves_name() {
        let traced = TracedExecutor::new(SyntheticExecutor::new());
        assert_eq!(traced.name(), traced.inner().name());
    }
}
