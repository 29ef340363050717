//! Run summary and reporting

use super::outcome::{RunOutcome, RunState};
use crate::core::state::watermark::WatermarkValue;
use crate::domain::ids::SourceId;
use std::time::Duration;

/// Summary of one extraction run
#[derive(Debug)]
pub struct RunSummary {
    /// Table that was read
    pub source: SourceId,

    /// Whether persist and commit were skipped
    pub dry_run: bool,

    /// Watermark the run started from, if it was loaded
    pub starting_watermark: Option<WatermarkValue>,

    /// Rows returned by the delta query
    pub rows_extracted: usize,

    /// Last state reached before the run ended
    pub state: RunState,

    /// How the run ended
    pub outcome: RunOutcome,

    /// Error from releasing the session, if any
    pub shutdown_error: Option<String>,

    /// Wall time of the run
    pub duration: Duration,
}

impl RunSummary {
    /// Check if the run succeeded or found nothing to do
    pub fn is_successful(&self) -> bool {
        self.outcome.is_success()
    }

    /// Process exit code for this run
    pub fn exit_code(&self) -> i32 {
        self.outcome.exit_code()
    }

    /// Log the summary
    pub fn log_summary(&self) {
        let starting = self
            .starting_watermark
            .as_ref()
            .map(ToString::to_string)
            .unwrap_or_else(|| "<not loaded>".to_string());

        match &self.outcome {
            RunOutcome::NoNewData { watermark } => tracing::info!(
                source = %self.source,
                watermark = %watermark.value,
                duration_ms = self.duration.as_millis() as u64,
                "No new data"
            ),
            RunOutcome::Success {
                rows_written,
                new_watermark,
                artifact,
            } => tracing::info!(
                source = %self.source,
                rows_written = rows_written,
                from = %starting,
                to = %new_watermark.value,
                artifact = %artifact,
                dry_run = self.dry_run,
                duration_ms = self.duration.as_millis() as u64,
                "Extraction completed"
            ),
            RunOutcome::Failed { stage, cause } => tracing::error!(
                source = %self.source,
                stage = %stage,
                error = %cause,
                state = ?self.state,
                rows_extracted = self.rows_extracted,
                watermark = %starting,
                duration_ms = self.duration.as_millis() as u64,
                "Extraction failed"
            ),
        }

        if let Some(error) = &self.shutdown_error {
            tracing::warn!(error = %error, "Session shutdown reported an error");
        }
    }
}
