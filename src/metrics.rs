//! Per-worker result table.
//!
//! The store is a concurrent map from worker identity to that worker's
//! append-only sequence of [`TaskRecord`]s. Writes go through a
//! [`MetricsWriter`], which is bound to one identity, cannot be cloned, and
//! can be registered only once per identity, so partition `i` is only ever
//! appended to by worker `i`.
//!
//! Reads are allowed at any time. Each partition is copied under its shard
//! lock, so a snapshot taken while workers run is consistent per worker but
//! may be torn across workers.

use crate::core::{Result, TaskRecord, WorkloadError};
use dashmap::DashMap;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};

const WAIT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Concurrent, partitioned, append-only result log
#[derive(Debug, Default)]
pub struct MetricsStore {
    partitions: DashMap<usize, Vec<TaskRecord>>,
}

impl MetricsStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the partition for `worker_id` and return its exclusive writer.
    ///
    /// # Errors
    ///
    /// Returns [`WorkloadError::InvalidConfig`] if the identity already has a
    /// writer.
    pub fn register(self: &Arc<Self>, worker_id: usize) -> Result<MetricsWriter> {
        match self.partitions.entry(worker_id) {
            dashmap::mapref::entry::Entry::Occupied(_) => Err(WorkloadError::invalid_config(
                "worker_id",
                format!("worker {} already has a metrics partition", worker_id),
            )),
            dashmap::mapref::entry::Entry::Vacant(slot) => {
                slot.insert(Vec::new());
                Ok(MetricsWriter {
                    worker_id,
                    store: Arc::clone(self),
                })
            }
        }
    }

    /// Copy of every partition, ordered by worker identity
    pub fn snapshot(&self) -> BTreeMap<usize, Vec<TaskRecord>> {
        self.partitions
            .iter()
            .map(|entry| (*entry.key(), entry.value().clone()))
            .collect()
    }

    /// Copy of one worker's records, `None` if the identity is unknown
    pub fn records_for(&self, worker_id: usize) -> Option<Vec<TaskRecord>> {
        self.partitions.get(&worker_id).map(|p| p.value().clone())
    }

    /// Number of records per worker
    pub fn counts(&self) -> BTreeMap<usize, usize> {
        self.partitions
            .iter()
            .map(|entry| (*entry.key(), entry.value().len()))
            .collect()
    }

    /// Total records across all workers
    pub fn total(&self) -> usize {
        self.partitions.iter().map(|entry| entry.value().len()).sum()
    }

    /// Registered worker identities, ascending
    pub fn worker_ids(&self) -> Vec<usize> {
        let mut ids: Vec<usize> = self.partitions.iter().map(|e| *e.key()).collect();
        ids.sort_unstable();
        ids
    }

    /// Polls until at least `expected` records exist or `timeout` elapses.
    ///
    /// Returns `true` if the total was reached.
    pub fn wait_for_total(&self, expected: usize, timeout: Duration) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if self.total() >= expected {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            thread::sleep(WAIT_POLL_INTERVAL);
        }
    }
}

/// Exclusive append handle for one worker's partition
#[derive(Debug)]
pub struct MetricsWriter {
    worker_id: usize,
    store: Arc<MetricsStore>,
}

impl MetricsWriter {
    /// Append a record to the end of this worker's sequence
    pub fn append(&self, record: TaskRecord) {
        self.store
            .partitions
            .entry(self.worker_id)
            .or_default()
            .push(record);
    }
}
