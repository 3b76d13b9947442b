//! Worker thread implementation

use crate::core::{CancellationToken, Result, Task, TaskExecutor, TaskKind, TaskOutput, TaskRecord, WorkloadError};
use crate::metrics::MetricsWriter;
use crate::pool::config::FailurePolicy;
use crate::queue::TaskQueue;
use chrono::{DateTime, Utc};
use crossbeam::channel::{Sender, TrySendError};
use log::debug;
use serde::Serialize;
use std::fmt;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

#[cfg(feature = "tracing")]
use tracing::{span, Level};

const JOIN_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Where a worker is in its loop
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[repr(u8)]
pub enum WorkerState {
    /// Spawned, loop not entered yet
    Idle = 0,
    /// Blocked in a timed queue wait
    Waiting = 1,
    /// Running a task body
    Executing = 2,
    /// Appending the result to the metrics store
    Recording = 3,
    /// Loop exited (cancelled, failed, or panicked)
    Terminated = 4,
}

impl WorkerState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => WorkerState::Idle,
            1 => WorkerState::Waiting,
            2 => WorkerState::Executing,
            3 => WorkerState::Recording,
            _ => WorkerState::Terminated,
        }
    }
}

/// Shared, atomically readable [`WorkerState`]
#[derive(Debug)]
pub struct WorkerStateCell(AtomicU8);

impl WorkerStateCell {
    fn new() -> Self {
        Self(AtomicU8::new(WorkerState::Idle as u8))
    }

    /// Current state
    pub fn get(&self) -> WorkerState {
        WorkerState::from_u8(self.0.load(Ordering::Acquire))
    }

    fn set(&self, state: WorkerState) {
        self.0.store(state as u8, Ordering::Release);
    }
}

/// Marks the worker terminated on every exit path, unwinding included.
struct TerminationGuard(Arc<WorkerStateCell>);

impl Drop for TerminationGuard {
    fn drop(&mut self) {
        self.0.set(WorkerState::Terminated);
    }
}

/// Why a task body did not produce an output
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum FailureCause {
    /// The executor returned an error
    Error(String),
    /// The executor panicked
    Panic(String),
}

impl fmt::Display for FailureCause {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureCause::Error(msg) => write!(f, "error: {}", msg),
            FailureCause::Panic(msg) => write!(f, "panic: {}", msg),
        }
    }
}

/// A failed task, as delivered under [`FailurePolicy::Report`]
#[derive(Clone, Debug, Serialize)]
pub struct WorkerFailure {
    /// Worker that ran the task
    pub worker_id: usize,
    /// Failed task id
    pub task_id: u64,
    /// Failed task kind
    pub kind: TaskKind,
    /// What went wrong
    pub cause: FailureCause,
    /// When the failure was observed
    pub at: DateTime<Utc>,
}

/// Result of joining a worker with a timeout
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum JoinOutcome {
    /// Thread finished and was joined
    Joined,
    /// Thread had already unwound from a panic
    Panicked(String),
    /// Thread was still running at the deadline and was left behind
    Detached,
}

/// Everything a worker needs, handed over at spawn time
pub(crate) struct WorkerContext {
    pub queue: Arc<dyn TaskQueue>,
    pub executor: Arc<dyn TaskExecutor>,
    pub writer: MetricsWriter,
    pub token: CancellationToken,
    pub take_timeout: Duration,
    pub failure_policy: FailurePolicy,
    pub failures: Sender<WorkerFailure>,
}

/// A worker thread that takes tasks from the queue until cancelled
#[derive(Debug)]
pub struct Worker {
    id: usize,
    thread: Option<thread::JoinHandle<()>>,
    state: Arc<WorkerStateCell>,
}

impl Worker {
    /// Spawn a worker thread named `name`
    pub(crate) fn spawn(id: usize, name: String, ctx: WorkerContext) -> Result<Self> {
        let state = Arc::new(WorkerStateCell::new());
        let state_clone = Arc::clone(&state);

        let thread = thread::Builder::new()
            .name(name)
            .spawn(move || {
                Self::run(id, ctx, state_clone);
            })
            .map_err(|e| WorkloadError::spawn_with_source(id, "thread spawn failed", e))?;

        Ok(Self {
            id,
            thread: Some(thread),
            state,
        })
    }

    /// Get worker identity
    pub fn id(&self) -> usize {
        self.id
    }

    /// Current loop state
    pub fn state(&self) -> WorkerState {
        self.state.get()
    }

    /// Shared handle on the loop state
    pub fn state_cell(&self) -> Arc<WorkerStateCell> {
        Arc::clone(&self.state)
    }

    /// Wait up to `timeout` for the thread to finish.
    ///
    /// A thread still running at the deadline is detached, not killed.
    pub fn join_timeout(mut self, timeout: Duration) -> JoinOutcome {
        let Some(thread) = self.thread.take() else {
            return JoinOutcome::Joined;
        };

        let start = Instant::now();
        while !thread.is_finished() {
            if start.elapsed() >= timeout {
                return JoinOutcome::Detached;
            }
            thread::sleep(JOIN_POLL_INTERVAL);
        }

        match thread.join() {
            Ok(()) => JoinOutcome::Joined,
            Err(panic_info) => JoinOutcome::Panicked(panic_message(panic_info.as_ref())),
        }
    }

    /// Main worker loop.
    ///
    /// Cancellation is observed only at the top of the loop. Tasks still
    /// queued when the token is cancelled are left in the queue.
    fn run(id: usize, ctx: WorkerContext, state: Arc<WorkerStateCell>) {
        #[cfg(feature = "tracing")]
        let worker_span = span!(Level::DEBUG, "worker", id = id);
        #[cfg(feature = "tracing")]
        let _guard = worker_span.enter();

        let _termination = TerminationGuard(Arc::clone(&state));
        let mut processed: u64 = 0;
        debug!("worker {} started", id);

        loop {
            if ctx.token.is_cancelled() {
                break;
            }

            state.set(WorkerState::Waiting);
            let Some(task) = ctx.queue.take(ctx.take_timeout) else {
                continue;
            };

            state.set(WorkerState::Executing);
            let start = Instant::now();
            let outcome = Self::execute_task(&*ctx.executor, &task, ctx.failure_policy);
            let elapsed = start.elapsed();

            match outcome {
                Ok(output) => {
                    state.set(WorkerState::Recording);
                    ctx.writer.append(TaskRecord {
                        task_id: task.id(),
                        kind: task.kind(),
                        output,
                        elapsed,
                    });
                    processed += 1;

                    #[cfg(feature = "tracing")]
                    crate::tracing::events::record_task_completed(id, task.kind(), elapsed);
                }
                Err(cause) => {
                    #[cfg(feature = "tracing")]
                    crate::tracing::events::record_task_failed(id, task.kind(), &cause);

                    match ctx.failure_policy {
                        FailurePolicy::Silent => {
                            debug!("worker {} exiting after task {} failed: {}", id, task.id(), cause);
                            break;
                        }
                        FailurePolicy::Report => {
                            let failure = WorkerFailure {
                                worker_id: id,
                                task_id: task.id(),
                                kind: task.kind(),
                                cause,
                                at: Utc::now(),
                            };
                            // Disconnected only means the pool is already gone.
                            if let Err(TrySendError::Full(failure)) = ctx.failures.try_send(failure) {
                                debug!(
                                    "worker {} dropped failure report for task {}: channel full",
                                    id, failure.task_id
                                );
                            }
                        }
                    }
                }
            }
        }

        #[cfg(feature = "tracing")]
        crate::tracing::events::record_worker_exit(id, processed);
        debug!("worker {} stopped after {} tasks", id, processed);
    }

    /// Run one task body.
    ///
    /// Under [`FailurePolicy::Silent`] panics are not caught and unwind the
    /// worker thread.
    fn execute_task(
        executor: &dyn TaskExecutor,
        task: &Task,
        policy: FailurePolicy,
    ) -> std::result::Result<TaskOutput, FailureCause> {
        #[cfg(feature = "tracing")]
        let job_span = span!(Level::DEBUG, "task_execution", kind = task.kind().as_str(), id = task.id());
        #[cfg(feature = "tracing")]
        let _job_guard = job_span.enter();

        match policy {
            FailurePolicy::Silent => executor
                .execute(task)
                .map_err(|e| FailureCause::Error(e.to_string())),
            FailurePolicy::Report => match catch_unwind(AssertUnwindSafe(|| executor.execute(task))) {
                Ok(Ok(output)) => Ok(output),
                Ok(Err(e)) => Err(FailureCause::Error(e.to_string())),
                Err(panic_info) => Err(FailureCause::Panic(panic_message(panic_info.as_ref()))),
            },
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        if let Some(thread) = self.thread.take() {
            if !thread.is_finished() {
                debug!("worker {} dropped while still running; detaching", self.id);
            }
        }
    }
}

fn panic_message(panic_info: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic_info.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic_info.downcast_ref::<String>() {
        s.clone()
    } else {
        "Unknown panic".to_string()
    }
}
