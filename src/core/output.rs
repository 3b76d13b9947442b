//! Task results as stored in the metrics table

use crate::core::task::TaskKind;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// The value a task produced. Its shape depends on the task kind.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum TaskOutput {
    /// Lowercase hex digest
    Digest(String),
    /// Integer aggregate
    Sum(u64),
    /// Middle element of a sorted sample
    Median(f64),
    /// Fallback random value
    Random(f64),
}

impl TaskOutput {
    /// Returns the digest string if this is a [`TaskOutput::Digest`]
    pub fn as_digest(&self) -> Option<&str> {
        match self {
            TaskOutput::Digest(d) => Some(d),
            _ => None,
        }
    }
}

impl fmt::Display for TaskOutput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskOutput::Digest(d) => f.write_str(d),
            TaskOutput::Sum(n) => write!(f, "{}", n),
            TaskOutput::Median(v) | TaskOutput::Random(v) => write!(f, "{}", v),
        }
    }
}

/// One entry in a worker's result sequence
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    /// Id of the task that produced the output
    pub task_id: u64,
    /// Kind of the task that produced the output
    pub kind: TaskKind,
    /// The produced value
    pub output: TaskOutput,
    /// Time spent executing the task body
    #[serde(with = "duration_micros")]
    pub elapsed: Duration,
}

mod duration_micros {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(u64::try_from(d.as_micros()).unwrap_or(u64::MAX))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        u64::deserialize(d).map(Duration::from_micros)
    }
}
