//! Worker pool lifecycle

use crate::core::{
    CancellationReason, CancellationToken, Result, SyntheticExecutor, Task, TaskExecutor,
    WorkloadError,
};
use crate::metrics::MetricsStore;
use crate::pool::config::WorkerPoolConfig;
use crate::pool::worker::{
    JoinOutcome, Worker, WorkerContext, WorkerFailure, WorkerState, WorkerStateCell,
};
use crate::queue::{BoundedQueue, ChannelQueue, QueueError, TaskQueue};
use crossbeam::channel::{self, Receiver, Sender};
use log::{debug, warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Lifecycle of a pool. There is no transition out of `Stopped`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum PoolState {
    /// Constructed, not started
    Idle,
    /// Workers spawned
    Running,
    /// Stopped; cannot be started again
    Stopped,
}

/// How `stop` ended for each worker
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct ShutdownSummary {
    /// Workers that finished within the join timeout
    pub joined: usize,
    /// Workers still running at the deadline, left behind
    pub detached: usize,
}

/// A fixed set of worker threads sharing one task queue and one metrics store.
///
/// # Shutdown Mechanism
///
/// `stop` cancels the pool's token. Each worker notices on its next loop
/// iteration, which happens at the latest one `take_timeout` after it went
/// idle. Tasks still in the queue are not drained.
///
/// # Example
///
/// ```
/// use rust_workload_generator::prelude::*;
/// use std::time::Duration;
///
/// # fn main() -> Result<()> {
/// let config = WorkerPoolConfig::new().with_take_timeout(Duration::from_millis(50));
/// let pool = WorkerPool::new(config)?;
/// pool.start(2)?;
///
/// for id in 0..4 {
///     pool.submit(Task::new(TaskKind::Hash, id))?;
/// }
/// pool.metrics().wait_for_total(4, Duration::from_secs(5));
///
/// let summary = pool.stop()?;
/// assert_eq!(summary.joined + summary.detached, 2);
/// # Ok(())
/// # }
/// ```
pub struct WorkerPool {
    config: WorkerPoolConfig,
    state: Mutex<PoolState>,
    workers: Mutex<Vec<Worker>>,
    worker_states: Mutex<Vec<Arc<WorkerStateCell>>>,
    queue: Arc<dyn TaskQueue>,
    executor: Arc<dyn TaskExecutor>,
    metrics: Arc<MetricsStore>,
    token: CancellationToken,
    failure_tx: Sender<WorkerFailure>,
    failure_rx: Receiver<WorkerFailure>,
    tasks_submitted: AtomicU64,
}

impl std::fmt::Debug for WorkerPool {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerPool")
            .field("config", &self.config)
            .field("state", &*self.state.lock())
            .field("queue", &self.queue.name())
            .field("executor", &self.executor.name())
            .field(
                "tasks_submitted",
                &self.tasks_submitted.load(Ordering::Relaxed),
            )
            .finish()
    }
}

impl WorkerPool {
    /// Create a pool running the built-in synthetic task bodies
    pub fn new(config: WorkerPoolConfig) -> Result<Self> {
        Self::with_executor(config, Arc::new(SyntheticExecutor::new()))
    }

    /// Create a pool with a custom executor
    pub fn with_executor(config: WorkerPoolConfig, executor: Arc<dyn TaskExecutor>) -> Result<Self> {
        config.validate()?;

        let queue: Arc<dyn TaskQueue> = match config.queue_capacity {
            Some(capacity) => Arc::new(BoundedQueue::new(capacity)),
            None => Arc::new(ChannelQueue::unbounded()),
        };
        let (failure_tx, failure_rx) = channel::bounded(config.failure_channel_capacity);

        Ok(Self {
            config,
            state: Mutex::new(PoolState::Idle),
            workers: Mutex::new(Vec::new()),
            worker_states: Mutex::new(Vec::new()),
            queue,
            executor,
            metrics: Arc::new(MetricsStore::new()),
            token: CancellationToken::new(),
            failure_tx,
            failure_rx,
            tasks_submitted: AtomicU64::new(0),
        })
    }

    /// Spawn up to `count` workers, clamped to the configured parallelism
    /// limit. Returns how many were spawned.
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if `count` is 0
    /// - `AlreadyRunning` if the pool is running
    /// - `PoolStopped` if the pool was stopped
    /// - `SpawnError` if a thread could not be created; workers spawned so
    ///   far are stopped again and the pool ends up `Stopped`
    pub fn start(&self, count: usize) -> Result<usize> {
        if count == 0 {
            return Err(WorkloadError::invalid_config(
                "worker_count",
                "Worker count must be greater than 0",
            ));
        }

        let mut state = self.state.lock();
        match *state {
            PoolState::Running => {
                return Err(WorkloadError::already_running(
                    &self.config.thread_name_prefix,
                    self.workers.lock().len(),
                ))
            }
            PoolState::Stopped => {
                return Err(WorkloadError::pool_stopped(&self.config.thread_name_prefix))
            }
            PoolState::Idle => {}
        }

        let count = count.min(self.config.parallelism_limit);
        let mut workers = Vec::with_capacity(count);
        for id in 0..count {
            match self.spawn_worker(id) {
                Ok(worker) => workers.push(worker),
                Err(e) => {
                    *state = PoolState::Stopped;
                    self.token.cancel_with_reason(CancellationReason::PoolStopped);
                    drop(state);
                    let summary = join_all(workers, &self.config);
                    warn!(
                        "pool '{}' failed to start worker {}: {} ({} joined, {} detached)",
                        self.config.thread_name_prefix, id, e, summary.joined, summary.detached
                    );
                    return Err(e);
                }
            }
        }

        *self.worker_states.lock() = workers.iter().map(Worker::state_cell).collect();
        *self.workers.lock() = workers;
        *state = PoolState::Running;

        #[cfg(feature = "tracing")]
        crate::tracing::events::record_pool_start(count, self.queue.name());
        debug!(
            "pool '{}' started {} workers on {}",
            self.config.thread_name_prefix,
            count,
            self.queue.name()
        );
        Ok(count)
    }

    fn spawn_worker(&self, id: usize) -> Result<Worker> {
        let ctx = WorkerContext {
            queue: Arc::clone(&self.queue),
            executor: Arc::clone(&self.executor),
            writer: self.metrics.register(id)?,
            token: self.token.clone(),
            take_timeout: self.config.take_timeout,
            failure_policy: self.config.failure_policy,
            failures: self.failure_tx.clone(),
        };
        Worker::spawn(
            id,
            format!("{}-{}", self.config.thread_name_prefix, id),
            ctx,
        )
    }

    /// Enqueue a task. Allowed in any state; tasks submitted to a stopped
    /// pool are never consumed.
    ///
    /// On a bounded queue this blocks while the queue is full.
    pub fn submit(&self, task: Task) -> Result<()> {
        self.queue.put(task).map_err(|e| self.queue_error(e))?;
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Enqueue a task without blocking
    ///
    /// # Errors
    ///
    /// Returns `QueueFull` if a bounded queue is at capacity.
    pub fn try_submit(&self, task: Task) -> Result<()> {
        self.queue.try_put(task).map_err(|e| self.queue_error(e))?;
        self.tasks_submitted.fetch_add(1, Ordering::Relaxed);
        Ok(())
    }

    /// Enqueue every task in order. Stops at the first failure and returns
    /// the error; tasks before it stay queued.
    pub fn submit_batch<I>(&self, tasks: I) -> Result<usize>
    where
        I: IntoIterator<Item = Task>,
    {
        let mut submitted = 0;
        for task in tasks {
            self.submit(task)?;
            submitted += 1;
        }
        Ok(submitted)
    }

    fn queue_error(&self, err: QueueError) -> WorkloadError {
        match err {
            QueueError::Full(_) => WorkloadError::queue_full(
                self.queue.len(),
                self.queue.capacity().unwrap_or_default(),
            ),
            QueueError::Disconnected(_) => WorkloadError::QueueDisconnected,
        }
    }

    /// Cancel the workers and join each one with the configured timeout.
    ///
    /// Workers still busy at their deadline are detached. Calling `stop` on a
    /// pool that never started, or a second time, does nothing.
    pub fn stop(&self) -> Result<ShutdownSummary> {
        self.stop_with_reason(CancellationReason::PoolStopped)
    }

    fn stop_with_reason(&self, reason: CancellationReason) -> Result<ShutdownSummary> {
        // Joining can take up to one join timeout per worker, so it happens
        // after the state lock is released.
        let workers = {
            let mut state = self.state.lock();
            match *state {
                PoolState::Idle | PoolState::Stopped => return Ok(ShutdownSummary::default()),
                PoolState::Running => {}
            }
            *state = PoolState::Stopped;
            self.token.cancel_with_reason(reason);
            std::mem::take(&mut *self.workers.lock())
        };
        let summary = join_all(workers, &self.config);

        #[cfg(feature = "tracing")]
        crate::tracing::events::record_pool_stop(summary.joined, summary.detached, self.queue.len());
        debug!(
            "pool '{}' stopped: {} joined, {} detached, {} tasks left queued",
            self.config.thread_name_prefix,
            summary.joined,
            summary.detached,
            self.queue.len()
        );
        Ok(summary)
    }

    /// Current lifecycle state
    pub fn state(&self) -> PoolState {
        *self.state.lock()
    }

    /// Check if the pool is running
    pub fn is_running(&self) -> bool {
        self.state() == PoolState::Running
    }

    /// Number of workers spawned by `start`
    pub fn worker_count(&self) -> usize {
        self.worker_states.lock().len()
    }

    /// Loop state of every worker, indexed by identity
    pub fn worker_states(&self) -> Vec<WorkerState> {
        self.worker_states.lock().iter().map(|s| s.get()).collect()
    }

    /// Total tasks accepted by `submit`
    pub fn tasks_submitted(&self) -> u64 {
        self.tasks_submitted.load(Ordering::Relaxed)
    }

    /// Tasks currently queued (approximate)
    pub fn queue_len(&self) -> usize {
        self.queue.len()
    }

    /// Shared result store
    pub fn metrics(&self) -> &Arc<MetricsStore> {
        &self.metrics
    }

    /// Shared task queue
    pub fn queue(&self) -> &Arc<dyn TaskQueue> {
        &self.queue
    }

    /// Failures reported by workers under
    /// [`FailurePolicy::Report`](crate::pool::FailurePolicy::Report)
    ///
    /// The channel holds at most
    /// [`failure_channel_capacity`](WorkerPoolConfig::failure_channel_capacity)
    /// reports. While it is full, workers drop new reports and keep running.
    pub fn failures(&self) -> &Receiver<WorkerFailure> {
        &self.failure_rx
    }

    /// Pool configuration
    pub fn config(&self) -> &WorkerPoolConfig {
        &self.config
    }
}

fn join_all(workers: Vec<Worker>, config: &WorkerPoolConfig) -> ShutdownSummary {
    let mut summary = ShutdownSummary::default();
    for worker in workers {
        let id = worker.id();
        match worker.join_timeout(config.join_timeout) {
            JoinOutcome::Joined => summary.joined += 1,
            JoinOutcome::Panicked(msg) => {
                debug!("worker {} had already died: {}", id, msg);
                summary.joined += 1;
            }
            JoinOutcome::Detached => {
                warn!(
                    "worker {} did not finish within {:?}; detaching",
                    id, config.join_timeout
                );
                summary.detached += 1;
            }
        }
    }
    summary
}

impl Drop for WorkerPool {
    fn drop(&mut self) {
        if self.is_running() {
            if let Err(e) = self.stop_with_reason(CancellationReason::PoolDropped) {
                warn!(
                    "failed to stop worker pool '{}' during drop: {}",
                    self.config.thread_name_prefix, e
                );
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{FnExecutor, TaskKind, TaskOutput};
    use crate::pool::FailurePolicy;
    use std::sync::atomic::AtomicUsize;
    use std::thread;
    use std::time::{Duration, Instant};

    fn fast_config() -> WorkerPoolConfig {
        WorkerPoolConfig::new()
            .with_parallelism_limit(8)
            .with_take_timeout(Duration::from_millis(20))
            .with_join_timeout(Duration::from_millis(500))
    }

    #[test]
    fn test_pool_creation() {
        let pool = WorkerPool::new(fast_config()).expect("Failed to create pool");
        assert_eq!(pool.state(), PoolState::Idle);
        assert!(!pool.is_running());
        assert_eq!(pool.worker_count(), 0);
        assert_eq!(pool.queue().name(), "crossbeam::channel::unbounded");
    }

    #[test]
    fn test_invalid_config_rejected() {
        let result = WorkerPool::new(WorkerPoolConfig::new().with_parallelism_limit(0));
        assert!(matches!(result, Err(WorkloadError::InvalidConfig { .. })));
    }

    #[test]
    fn test_start_clamps_to_parallelism_limit() {
        let pool = WorkerPool::new(fast_config().with_parallelism_limit(2)).unwrap();
        assert_eq!(pool.start(5).unwrap(), 2);
        assert_eq!(pool.worker_count(), 2);
        assert_eq!(pool.metrics().worker_ids(), vec![0, 1]);
        pool.stop().unwrap();
    }

    #[test]
    fn test_start_zero_rejected() {
        let pool = WorkerPool::new(fast_config()).unwrap();
        assert!(matches!(
            pool.start(0),
            Err(WorkloadError::InvalidConfig { .. })
        ));
        assert_eq!(pool.state(), PoolState::Idle);
    }

    #[test]
    fn test_double_start_and_restart_rejected() {
        let pool = WorkerPool::new(fast_config()).unwrap();
        pool.start(2).unwrap();
        assert!(matches!(
            pool.start(2),
            Err(WorkloadError::AlreadyRunning { worker_count: 2, .. })
        ));

        pool.stop().unwrap();
        assert!(matches!(
            pool.start(2),
            Err(WorkloadError::PoolStopped { .. })
        ));
    }

    #[test]
    fn test_stop_is_noop_when_not_running() {
        let pool = WorkerPool::new(fast_config()).unwrap();
        assert_eq!(pool.stop().unwrap(), ShutdownSummary::default());
        assert_eq!(pool.state(), PoolState::Idle);

        pool.start(1).unwrap();
        assert_eq!(pool.stop().unwrap().joined, 1);
        assert_eq!(pool.stop().unwrap(), ShutdownSummary::default());
    }

    #[test]
    fn test_tasks_are_recorded() {
        let pool = WorkerPool::new(fast_config()).unwrap();
        pool.start(3).unwrap();

        let n = pool
            .submit_batch((0..30).map(|id| Task::new(TaskKind::Math, id)))
            .unwrap();
        assert_eq!(n, 30);
        assert_eq!(pool.tasks_submitted(), 30);
        assert!(pool.metrics().wait_for_total(30, Duration::from_secs(5)));

        pool.stop().unwrap();
        assert_eq!(pool.metrics().total(), 30);
    }

    #[test]
    fn test_submit_before_start_is_kept() {
        let pool = WorkerPool::new(fast_config()).unwrap();
        pool.submit(Task::new(TaskKind::Hash, 1)).unwrap();
        assert_eq!(pool.queue_len(), 1);

        pool.start(1).unwrap();
        assert!(pool.metrics().wait_for_total(1, Duration::from_secs(5)));
        pool.stop().unwrap();
    }

    #[test]
    fn test_submit_after_stop_is_not_consumed() {
        let pool = WorkerPool::new(fast_config()).unwrap();
        pool.start(2).unwrap();
        pool.stop().unwrap();

        pool.submit(Task::new(TaskKind::Sort, 1)).unwrap();
        thread::sleep(Duration::from_millis(50));
        assert_eq!(pool.queue_len(), 1);
        assert_eq!(pool.metrics().total(), 0);
    }

    #[test]
    fn test_worker_states_after_stop() {
        let pool = WorkerPool::new(fast_config()).unwrap();
        pool.start(3).unwrap();
        pool.stop().unwrap();
        assert_eq!(pool.worker_states(), vec![WorkerState::Terminated; 3]);
    }

    #[test]
    fn test_try_submit_on_full_queue() {
        let pool = WorkerPool::new(fast_config().with_queue_capacity(1)).unwrap();
        pool.try_submit(Task::new(TaskKind::Hash, 1)).unwrap();
        assert!(matches!(
            pool.try_submit(Task::new(TaskKind::Hash, 2)),
            Err(WorkloadError::QueueFull { current: 1, max: 1 })
        ));
        assert_eq!(pool.tasks_submitted(), 1);
    }

    #[test]
    fn test_stop_detaches_busy_worker() {
        let slow: Arc<dyn TaskExecutor> = Arc::new(FnExecutor::new(|task: &Task| {
            thread::sleep(Duration::from_millis(400));
            Ok(TaskOutput::Sum(task.id()))
        }));
        let pool = WorkerPool::with_executor(
            fast_config().with_join_timeout(Duration::from_millis(30)),
            slow,
        )
        .unwrap();
        pool.start(1).unwrap();
        pool.submit(Task::new(TaskKind::Math, 1)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while pool.worker_states()[0] != WorkerState::Executing && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        let summary = pool.stop().unwrap();
        assert_eq!(summary, ShutdownSummary { joined: 0, detached: 1 });
    }

    #[test]
    fn test_report_policy_exposes_failures() {
        let executor: Arc<dyn TaskExecutor> = Arc::new(FnExecutor::new(|task: &Task| {
            if task.id() % 2 == 0 {
                Err(WorkloadError::task_failed(task.id(), task.kind().as_str(), "even"))
            } else {
                Ok(TaskOutput::Sum(task.id()))
            }
        }));
        let pool = WorkerPool::with_executor(
            fast_config().with_failure_policy(FailurePolicy::Report),
            executor,
        )
        .unwrap();
        pool.start(2).unwrap();
        pool.submit_batch((0..10).map(|id| Task::new(TaskKind::Math, id)))
            .unwrap();

        assert!(pool.metrics().wait_for_total(5, Duration::from_secs(5)));
        let mut failed = Vec::new();
        let deadline = Instant::now() + Duration::from_secs(5);
        while failed.len() < 5 && Instant::now() < deadline {
            if let Ok(f) = pool.failures().recv_timeout(Duration::from_millis(50)) {
                failed.push(f.task_id);
            }
        }
        failed.sort_unstable();
        assert_eq!(failed, vec![0, 2, 4, 6, 8]);

        pool.stop().unwrap();
    }

    #[test]
    fn test_full_failure_channel_drops_reports() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&calls);
        let failing: Arc<dyn TaskExecutor> = Arc::new(FnExecutor::new(move |task: &Task| {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(WorkloadError::task_failed(task.id(), task.kind().as_str(), "always"))
        }));
        let pool = WorkerPool::with_executor(
            fast_config()
                .with_failure_policy(FailurePolicy::Report)
                .with_failure_channel_capacity(2),
            failing,
        )
        .unwrap();
        pool.start(1).unwrap();
        pool.submit_batch((0..10).map(|id| Task::new(TaskKind::Hash, id)))
            .unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        while calls.load(Ordering::SeqCst) < 10 && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(calls.load(Ordering::SeqCst), 10);
        assert_eq!(pool.failures().len(), 2);
        assert_ne!(pool.worker_states()[0], WorkerState::Terminated);

        let ids: Vec<u64> = pool.failures().try_iter().map(|f| f.task_id).collect();
        assert_eq!(ids, vec![0, 1]);
        pool.stop().unwrap();
    }

    #[test]
    fn test_state_readable_while_stop_joins() {
        let slow: Arc<dyn TaskExecutor> = Arc::new(FnExecutor::new(|task: &Task| {
            thread::sleep(Duration::from_millis(1000));
            Ok(TaskOutput::Sum(task.id()))
        }));
        let pool = Arc::new(
            WorkerPool::with_executor(
                fast_config().with_join_timeout(Duration::from_millis(300)),
                slow,
            )
            .unwrap(),
        );
        pool.start(1).unwrap();
        pool.submit(Task::new(TaskKind::Math, 1)).unwrap();

        let deadline = Instant::now() + Duration::from_secs(2);
        while pool.worker_states()[0] != WorkerState::Executing && Instant::now() < deadline {
            thread::sleep(Duration::from_millis(1));
        }

        let stopper = {
            let pool = Arc::clone(&pool);
            thread::spawn(move || pool.stop())
        };
        thread::sleep(Duration::from_millis(30));

        let start = Instant::now();
        assert!(!pool.is_running());
        assert_eq!(pool.state(), PoolState::Stopped);
        assert!(start.elapsed() < Duration::from_millis(100));

        let summary = stopper.join().unwrap().unwrap();
        assert_eq!(summary, ShutdownSummary { joined: 0, detached: 1 });
    }

    #[test]
    fn test_drop_stops_workers() {
        let pool = WorkerPool::new(fast_config()).unwrap();
        pool.start(2).unwrap();
        let states: Vec<_> = pool.worker_states.lock().clone();
        drop(pool);
        assert!(states.iter().all(|s| s.get() == WorkerState::Terminated));
    }
}
