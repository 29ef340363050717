//! Extraction runner - orchestrates one incremental run
//!
//! Stages run strictly in order: load the watermark, extract, persist,
//! commit. The watermark is committed only after the artifact is durably
//! written, so a crash at any point can duplicate rows in a later run but
//! never skip them. The mover is shut down on every exit path.

use super::artifact::ArtifactPath;
use super::outcome::{RunOutcome, RunStage, RunState};
use super::summary::RunSummary;
use crate::adapters::checkpoint::WatermarkStore;
use crate::adapters::mover::DataMover;
use crate::config::{HighwaterConfig, OutputFormat};
use crate::core::query::build_delta_query;
use crate::core::state::watermark::WatermarkValue;
use crate::core::state::StateManager;
use crate::domain::ids::{ColumnName, SourceId};
use crate::domain::{HighwaterError, Result};
use crate::{log_error_with_context, log_run_start, log_stage_transition};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::watch;

/// Clock used to name artifacts
pub type Clock = Arc<dyn Fn() -> DateTime<Utc> + Send + Sync>;

/// What a run extracts and where it writes
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub source: SourceId,
    pub key_column: ColumnName,
    pub prefix: String,
    pub format: OutputFormat,
    pub dry_run: bool,
}

impl RunSettings {
    /// Derive settings from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns a configuration error for an invalid table or key column.
    pub fn from_config(config: &HighwaterConfig) -> Result<Self> {
        Ok(Self {
            source: config
                .source
                .source_id()
                .map_err(HighwaterError::Configuration)?,
            key_column: config
                .source
                .key_column()
                .map_err(HighwaterError::Configuration)?,
            prefix: config.storage.prefix.clone(),
            format: config.storage.format,
            dry_run: config.application.dry_run,
        })
    }
}

struct StageFailure {
    stage: RunStage,
    cause: HighwaterError,
}

trait AtStage<T> {
    fn at(self, stage: RunStage) -> std::result::Result<T, StageFailure>;
}

impl<T> AtStage<T> for Result<T> {
    fn at(self, stage: RunStage) -> std::result::Result<T, StageFailure> {
        self.map_err(|cause| StageFailure { stage, cause })
    }
}

#[derive(Default)]
struct Progress {
    state: Option<RunState>,
    starting_watermark: Option<WatermarkValue>,
    rows_extracted: usize,
}

impl Progress {
    fn enter(&mut self, next: RunState) {
        let current = self.state.unwrap_or(RunState::Init);
        log_stage_transition!(current, next);
        self.state = Some(next);
    }

    fn current(&self) -> RunState {
        self.state.unwrap_or(RunState::Init)
    }
}

/// Drives one extraction run against a checkpoint store and a data mover
pub struct ExtractionRunner {
    settings: RunSettings,
    state: StateManager,
    mover: Arc<dyn DataMover>,
    shutdown_signal: Option<watch::Receiver<bool>>,
    clock: Clock,
}

impl ExtractionRunner {
    /// Create a runner
    pub fn new(
        settings: RunSettings,
        store: Arc<dyn WatermarkStore>,
        mover: Arc<dyn DataMover>,
    ) -> Self {
        Self {
            settings,
            state: StateManager::new(store),
            mover,
            shutdown_signal: None,
            clock: Arc::new(Utc::now),
        }
    }

    /// Stop before extract or persist once `signal` turns true
    ///
    /// A run that has already persisted its artifact always commits.
    pub fn with_shutdown_signal(mut self, signal: watch::Receiver<bool>) -> Self {
        self.shutdown_signal = Some(signal);
        self
    }

    /// Replace the clock used for artifact names
    pub fn with_clock(mut self, clock: Clock) -> Self {
        self.clock = clock;
        self
    }

    /// Execute the run and release the mover
    ///
    /// Never returns an error: every failure is reported through
    /// [`RunOutcome::Failed`] in the summary.
    pub async fn run(self) -> RunSummary {
        let started = Instant::now();
        let mut progress = Progress::default();

        log_run_start!(
            self.settings.source,
            self.settings.key_column,
            self.settings.dry_run
        );

        let outcome = match self.run_stages(&mut progress).await {
            Ok(outcome) => outcome,
            Err(StageFailure { stage, cause }) => {
                log_error_with_context!(&cause, format!("{stage} stage failed"));
                progress.enter(RunState::Failed(stage));
                RunOutcome::Failed { stage, cause }
            }
        };

        let shutdown_error = match self.mover.shutdown().await {
            Ok(()) => None,
            Err(e) => Some(e.to_string()),
        };

        let summary = RunSummary {
            source: self.settings.source.clone(),
            dry_run: self.settings.dry_run,
            starting_watermark: progress.starting_watermark.clone(),
            rows_extracted: progress.rows_extracted,
            state: progress.current(),
            outcome,
            shutdown_error,
            duration: started.elapsed(),
        };
        summary.log_summary();
        summary
    }

    fn check_shutdown(&self, before: RunStage) -> std::result::Result<(), StageFailure> {
        let requested = self
            .shutdown_signal
            .as_ref()
            .map(|rx| *rx.borrow())
            .unwrap_or(false);

        if requested {
            tracing::warn!(stage = %before, "Shutdown requested, stopping before {before}");
            return Err(StageFailure {
                stage: before,
                cause: HighwaterError::Interrupted(format!("shutdown requested before {before}")),
            });
        }
        Ok(())
    }

    async fn run_stages(
        &self,
        progress: &mut Progress,
    ) -> std::result::Result<RunOutcome, StageFailure> {
        let settings = &self.settings;

        let watermark = self
            .state
            .read(&settings.source)
            .await
            .at(RunStage::LoadWatermark)?;
        progress.starting_watermark = Some(watermark.value.clone());
        progress.enter(RunState::WatermarkLoaded);

        self.check_shutdown(RunStage::Extract)?;
        let query = build_delta_query(&settings.source, &settings.key_column, &watermark);
        tracing::debug!(sql = %query.sql, full_scan = query.is_full_scan(), "Delta query built");

        let batch = self.mover.extract(&query).await.at(RunStage::Extract)?;
        progress.rows_extracted = batch.row_count();
        progress.enter(RunState::Extracted);

        let max_key = match batch.max_key() {
            Some(max_key) => max_key,
            None => {
                progress.enter(RunState::NoOp);
                return Ok(RunOutcome::NoNewData { watermark });
            }
        };
        let next = watermark.advanced_to(max_key);

        let path = ArtifactPath::for_run(
            &settings.prefix,
            &settings.source,
            (self.clock)(),
            settings.format,
        );

        if settings.dry_run {
            tracing::info!(
                rows = batch.row_count(),
                artifact = %path,
                "DRY RUN: Would write artifact"
            );
            tracing::info!(
                from = %watermark.value,
                to = %next.value,
                "DRY RUN: Would commit watermark"
            );
            return Ok(RunOutcome::Success {
                rows_written: batch.row_count(),
                new_watermark: next,
                artifact: path.to_string(),
            });
        }

        self.check_shutdown(RunStage::Persist)?;
        let artifact = self
            .mover
            .persist(&batch, &path, settings.format)
            .await
            .at(RunStage::Persist)?;
        progress.enter(RunState::Written);
        tracing::info!(rows = batch.row_count(), artifact = %artifact, "Artifact written");

        self.state
            .commit(&watermark, &next)
            .await
            .at(RunStage::Commit)?;
        progress.enter(RunState::Committed);

        Ok(RunOutcome::Success {
            rows_written: batch.row_count(),
            new_watermark: next,
            artifact,
        })
    }
}
