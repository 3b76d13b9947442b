//! Final run report

use crate::analysis::AnalysisReport;
use crate::core::Result;
use crate::pool::ShutdownSummary;
use chrono::{DateTime, Local, SecondsFormat};
use serde::Serialize;
use std::collections::BTreeMap;
use uuid::Uuid;

/// Everything one orchestrator run produced
#[derive(Clone, Debug, Serialize)]
pub struct RunReport {
    /// Unique run identifier
    pub run_id: Uuid,
    /// When the run finished (local time)
    pub completed_at: DateTime<Local>,
    /// Workers actually spawned
    pub workers: usize,
    /// Tasks enqueued
    pub tasks_submitted: u64,
    /// Results present in the metrics store after stop
    pub results_recorded: usize,
    /// Result count per worker identity
    pub per_worker: BTreeMap<usize, usize>,
    /// Outcome of stopping the pool
    pub shutdown: ShutdownSummary,
    /// Analysis results, `None` when analysis was disabled
    pub analysis: Option<AnalysisReport>,
}

impl RunReport {
    /// `Analysis completed at <ISO-8601 local timestamp>`
    pub fn completion_line(&self) -> String {
        format!(
            "Analysis completed at {}",
            self.completed_at
                .to_rfc3339_opts(SecondsFormat::Micros, false)
        )
    }

    /// Tasks submitted but never recorded
    pub fn unprocessed(&self) -> u64 {
        self.tasks_submitted
            .saturating_sub(self.results_recorded as u64)
    }

    /// Pretty-printed JSON
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
