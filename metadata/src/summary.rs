// SPDX-License-Identifier: PMPL-1.0-or-later
//! Run summary

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::pipeline::{PipelineOutcome, PipelineReport};

/// Counts written to `summary.json`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RunSummary {
    pub total_plugins: usize,
    pub valid_plugins: usize,
    pub archived_plugins: usize,
    pub renamed_plugins: usize,
    pub skipped_plugins: usize,
    pub execution_time_seconds: f64,
}

impl RunSummary {
    pub fn new(total_plugins: usize) -> Self {
        Self {
            total_plugins,
            ..Default::default()
        }
    }

    /// Count one finished pipeline
    pub fn record(&mut self, report: &PipelineReport) {
        match report.outcome {
            PipelineOutcome::Valid { .. } => self.valid_plugins += 1,
            PipelineOutcome::Archived { .. } => self.archived_plugins += 1,
            PipelineOutcome::Failed { .. } => self.skipped_plugins += 1,
        }
        if report.is_renamed() {
            self.renamed_plugins += 1;
        }
    }

    /// Count a pipeline that never produced a report
    pub fn record_lost(&mut self) {
        self.skipped_plugins += 1;
    }

    /// Stamp the elapsed time, rounded to hundredths of a second
    pub fn finish(mut self, elapsed: Duration) -> Self {
        self.execution_time_seconds = (elapsed.as_secs_f64() * 100.0).round() / 100.0;
        self
    }
}
