//! Task executors: the bodies workers run for each task

use crate::core::error::Result;
use crate::core::output::TaskOutput;
use crate::core::task::{Task, TaskKind};
use sha2::{Digest, Sha256};
use std::fmt;

/// Number of draws summed by a Math task
pub const MATH_DRAWS: usize = 1000;
/// Inclusive bounds of each Math draw
pub const MATH_DRAW_RANGE: std::ops::RangeInclusive<u64> = 1..=100;
/// Sample size generated by a Sort task
pub const SORT_SAMPLE_LEN: usize = 5000;

/// Turns a [`Task`] into a [`TaskOutput`].
///
/// Executors are shared by every worker of a pool, so they must be
/// `Send + Sync`. An `Err` (or a panic) is treated according to the pool's
/// [`FailurePolicy`](crate::pool::FailurePolicy).
pub trait TaskExecutor: Send + Sync {
    /// Execute the task body
    ///
    /// # Errors
    ///
    /// Returns an error if the computation fails
    fn execute(&self, task: &Task) -> Result<TaskOutput>;

    /// Executor name for debugging
    fn name(&self) -> &str {
        "TaskExecutor"
    }
}

impl fmt::Debug for dyn TaskExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TaskExecutor({})", self.name())
    }
}

/// Executor built from a closure
pub struct FnExecutor<F>
where
    F: Fn(&Task) -> Result<TaskOutput> + Send + Sync,
{
    f: F,
    name: String,
}

impl<F> FnExecutor<F>
where
    F: Fn(&Task) -> Result<TaskOutput> + Send + Sync,
{
    /// Create a new closure executor
    pub fn new(f: F) -> Self {
        Self {
            f,
            name: "FnExecutor".to_string(),
        }
    }

    /// Create a new closure executor with a custom name
    pub fn with_name<S: Into<String>>(f: F, name: S) -> Self {
        Self { f, name: name.into() }
    }
}

impl<F> TaskExecutor for FnExecutor<F>
where
    F: Fn(&Task) -> Result<TaskOutput> + Send + Sync,
{
    fn execute(&self, task: &Task) -> Result<TaskOutput> {
        (self.f)(task)
    }

    fn name(&self) -> &str {
        &self.name
    }
}

/// The default executor: CPU-bound hash, math and sort bodies.
///
/// Without a seed every call draws from fresh entropy. With a seed, the
/// generator for a task is seeded with `seed ^ task.id()`, which makes Math,
/// Sort and Unknown results reproducible.
#[derive(Clone, Debug, Default)]
pub struct SyntheticExecutor {
    seed: Option<u64>,
}

impl SyntheticExecutor {
    /// Executor drawing from fresh entropy
    pub fn new() -> Self {
        Self::default()
    }

    /// Executor with reproducible draws
    pub fn with_seed(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    /// The generator used for `task`
    pub fn rng_for(&self, task: &Task) -> fastrand::Rng {
        match self.seed {
            Some(seed) => fastrand::Rng::with_seed(seed ^ task.id()),
            None => fastrand::Rng::new(),
        }
    }
}

impl TaskExecutor for SyntheticExecutor {
    fn execute(&self, task: &Task) -> Result<TaskOutput> {
        let mut rng = self.rng_for(task);
        let output = match task.kind() {
            TaskKind::Hash => TaskOutput::Digest(hash_digest(task.id())),
            TaskKind::Math => TaskOutput::Sum(sum_draws(&mut rng, MATH_DRAWS)),
            TaskKind::Sort => TaskOutput::Median(sample_median(&mut rng, SORT_SAMPLE_LEN)),
            TaskKind::Unknown => TaskOutput::Random(rng.f64()),
        };
        Ok(output)
    }

    fn name(&self) -> &str {
        "SyntheticExecutor"
    }
}

/// Lowercase hex SHA-256 of the decimal id
pub fn hash_digest(id: u64) -> String {
    hex::encode(Sha256::digest(id.to_string().as_bytes()))
}

/// Sum of `draws` integers from [`MATH_DRAW_RANGE`]
pub fn sum_draws(rng: &mut fastrand::Rng, draws: usize) -> u64 {
    (0..draws).map(|_| rng.u64(MATH_DRAW_RANGE)).sum()
}

/// Generates `len` floats in `[0, 1)` and returns their middle element
pub fn sample_median(rng: &mut fastrand::Rng, len: usize) -> f64 {
    let mut values: Vec<f64> = (0..len).map(|_| rng.f64()).collect();
    middle_element(&mut values).unwrap_or(0.0)
}

/// Sorts `values` and returns the lower median, index `(len - 1) / 2`
pub fn middle_element(values: &mut [f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    values.sort_by(f64::total_cmp);
    Some(values[(values.len() - 1) / 2])
}
