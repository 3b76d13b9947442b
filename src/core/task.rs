//! Task description and kinds

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Inclusive range used when a task is created without an explicit id
pub const RANDOM_ID_RANGE: std::ops::RangeInclusive<u64> = 1..=1_000_000;

/// The kind of synthetic work a task asks for
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskKind {
    /// SHA-256 digest over the task id
    Hash,
    /// Sum of bounded random integers
    Math,
    /// Median of a sorted random sample
    Sort,
    /// Anything else; yields a random float
    Unknown,
}

impl TaskKind {
    /// Kinds the orchestrator draws from when building a batch
    pub const SUBMITTABLE: [TaskKind; 3] = [TaskKind::Hash, TaskKind::Math, TaskKind::Sort];

    /// Stable lowercase name
    pub fn as_str(&self) -> &'static str {
        match self {
            TaskKind::Hash => "hash",
            TaskKind::Math => "math",
            TaskKind::Sort => "sort",
            TaskKind::Unknown => "unknown",
        }
    }

    /// Pick one of [`TaskKind::SUBMITTABLE`] uniformly
    pub fn random(rng: &mut fastrand::Rng) -> Self {
        Self::SUBMITTABLE[rng.usize(..Self::SUBMITTABLE.len())]
    }
}

impl fmt::Display for TaskKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for TaskKind {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "hash" => TaskKind::Hash,
            "math" => TaskKind::Math,
            "sort" => TaskKind::Sort,
            _ => TaskKind::Unknown,
        })
    }
}

/// An immutable unit of synthetic work.
///
/// Tasks are moved into the queue on submission and moved out by exactly one
/// worker, so a dequeued task is owned by that worker alone.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Task {
    kind: TaskKind,
    id: u64,
    submitted_at: DateTime<Utc>,
}

impl Task {
    /// Create a task with a caller-supplied id
    pub fn new(kind: TaskKind, id: u64) -> Self {
        Self {
            kind,
            id,
            submitted_at: Utc::now(),
        }
    }

    /// Create a task whose id is drawn from [`RANDOM_ID_RANGE`]
    pub fn with_random_id(kind: TaskKind) -> Self {
        Self::new(kind, fastrand::u64(RANDOM_ID_RANGE))
    }

    /// Kind of work
    pub fn kind(&self) -> TaskKind {
        self.kind
    }

    /// Task identifier
    pub fn id(&self) -> u64 {
        self.id
    }

    /// Time the task was created
    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }
}
