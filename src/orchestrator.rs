//! One end-to-end workload run.
//!
//! The orchestrator starts a pool, enqueues a batch of randomly typed tasks,
//! runs the analysis exercises on its own thread while the workers drain the
//! queue, then stops the pool and assembles a [`RunReport`].
//!
//! By default nothing waits for the batch to be consumed before `stop`, so a
//! run may record fewer results than it submitted. Set
//! [`OrchestratorConfig::wait_for_drain`] to wait for them.

use crate::analysis::AnalysisReport;
use crate::core::{Result, SyntheticExecutor, Task, TaskExecutor, TaskKind, WorkloadError};
use crate::pool::{WorkerPool, WorkerPoolConfig};
use crate::report::RunReport;
use chrono::Local;
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::{Duration, Instant};
use uuid::Uuid;

/// Configuration for an [`Orchestrator`] run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrchestratorConfig {
    /// Workers requested from the pool
    pub worker_count: usize,
    /// Tasks enqueued, with ids `0..batch_size`
    pub batch_size: u64,
    /// Pool settings
    pub pool: WorkerPoolConfig,
    /// Run the analysis exercises
    pub run_analysis: bool,
    /// Wait up to this long for every task to be recorded before stopping
    pub wait_for_drain: Option<Duration>,
    /// Seed for task kind selection and task bodies
    pub seed: Option<u64>,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            worker_count: 3,
            batch_size: 100,
            pool: WorkerPoolConfig::default(),
            run_analysis: true,
            wait_for_drain: None,
            seed: None,
        }
    }
}

impl OrchestratorConfig {
    /// Create a configuration with defaults
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set requested worker count
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_worker_count(mut self, count: usize) -> Self {
        self.worker_count = count;
        self
    }

    /// Set batch size
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_batch_size(mut self, size: u64) -> Self {
        self.batch_size = size;
        self
    }

    /// Set pool configuration
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_pool_config(mut self, pool: WorkerPoolConfig) -> Self {
        self.pool = pool;
        self
    }

    /// Enable or disable the analysis exercises
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_analysis(mut self, enabled: bool) -> Self {
        self.run_analysis = enabled;
        self
    }

    /// Wait up to `timeout` for the batch to be recorded before stopping
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_drain_wait(mut self, timeout: Duration) -> Self {
        self.wait_for_drain = Some(timeout);
        self
    }

    /// Make task kinds and task bodies reproducible
    #[must_use = "builder methods return a new value and do not modify the original"]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.worker_count == 0 {
            return Err(WorkloadError::invalid_config(
                "worker_count",
                "Worker count must be greater than 0",
            ));
        }
        self.pool.validate()
    }
}

/// Drives a single run
#[derive(Debug)]
pub struct Orchestrator {
    config: OrchestratorConfig,
    executor: Arc<dyn TaskExecutor>,
}

impl Orchestrator {
    /// Orchestrator using the built-in task bodies
    pub fn new(config: OrchestratorConfig) -> Result<Self> {
        let executor: Arc<dyn TaskExecutor> = match config.seed {
            Some(seed) => Arc::new(SyntheticExecutor::with_seed(seed)),
            None => Arc::new(SyntheticExecutor::new()),
        };
        Self::with_executor(config, executor)
    }

    /// Orchestrator with a custom executor
    pub fn with_executor(config: OrchestratorConfig, executor: Arc<dyn TaskExecutor>) -> Result<Self> {
        config.validate()?;
        Ok(Self { config, executor })
    }

    /// Run configuration
    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// The batch this run submits: ids `0..batch_size`, kinds drawn
    /// uniformly from Hash, Math and Sort.
    pub fn batch(&self) -> Vec<Task> {
        let mut rng = match self.config.seed {
            Some(seed) => fastrand::Rng::with_seed(seed),
            None => fastrand::Rng::new(),
        };
        (0..self.config.batch_size)
            .map(|id| Task::new(TaskKind::random(&mut rng), id))
            .collect()
    }

    /// Execute the run.
    ///
    /// Fails only if the pool cannot be built or started; task failures
    /// inside workers never fail the run.
    pub fn run(&self) -> Result<RunReport> {
        let started_at = Instant::now();
        let pool = WorkerPool::with_executor(self.config.pool.clone(), Arc::clone(&self.executor))?;
        let workers = pool.start(self.config.worker_count)?;

        let submitted = pool.submit_batch(self.batch())?;
        debug!("submitted {} tasks to {} workers", submitted, workers);

        let analysis = self
            .config
            .run_analysis
            .then(|| AnalysisReport::run(started_at, workers));

        if let Some(timeout) = self.config.wait_for_drain {
            if !pool.metrics().wait_for_total(submitted, timeout) {
                warn!(
                    "drain wait timed out after {:?} with {}/{} results",
                    timeout,
                    pool.metrics().total(),
                    submitted
                );
            }
        }

        let shutdown = pool.stop()?;
        let per_worker = pool.metrics().counts();
        let results_recorded = per_worker.values().sum();

        let report = RunReport {
            run_id: Uuid::new_v4(),
            completed_at: Local::now(),
            workers,
            tasks_submitted: pool.tasks_submitted(),
            results_recorded,
            per_worker,
            shutdown,
            analysis,
        };
        debug!(
            "run {} finished: {}/{} recorded in {:?}",
            report.run_id,
            report.results_recorded,
            report.tasks_submitted,
            started_at.elapsed()
        );
        Ok(report)
    }
}
