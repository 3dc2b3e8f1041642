//! Pipeline metrics
//!
//! Recorded through the `metrics` facade; they are no-ops until a recorder
//! is installed.

use std::time::Duration;

/// Pipeline stages that produce tables
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    /// Team-long event table
    TeamLong,
    /// Matchup feature rows
    Features,
    /// Model training
    Training,
    /// Scored odds quotes
    Scoring,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::TeamLong => "team_long",
            Stage::Features => "features",
            Stage::Training => "training",
            Stage::Scoring => "scoring",
        }
    }
}

/// Count rows emitted by a stage
pub fn record_rows(stage: Stage, rows: usize) {
    metrics::counter!("nbaev_rows_processed_total", "stage" => stage.as_str())
        .increment(rows as u64);
    tracing::trace!(stage = stage.as_str(), rows, "Recorded rows");
}

/// Record how long a stage took
pub fn record_duration(stage: Stage, duration: Duration) {
    metrics::histogram!("nbaev_stage_duration_seconds", "stage" => stage.as_str())
        .record(duration.as_secs_f64());
    tracing::debug!(
        stage = stage.as_str(),
        elapsed_ms = duration.as_millis() as u64,
        "Stage finished"
    );
}
