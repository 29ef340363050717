//! Run command implementation
//!
//! Loads configuration, connects, and executes one extraction run.

use crate::adapters::checkpoint::create_watermark_store;
use crate::adapters::mover::ExtractionSession;
use crate::config::{load_config_or_default, HighwaterConfig, OutputFormat};
use crate::core::extract::{error_exit_code, ExtractionRunner, RunOutcome, RunSettings, RunStage};
use clap::Args;
use std::sync::Arc;
use tokio::sync::watch;

/// Arguments for the run command
#[derive(Args, Debug)]
pub struct RunArgs {
    /// Dry run mode - extract but write neither artifact nor checkpoint
    #[arg(long)]
    pub dry_run: bool,

    /// Override the source table
    #[arg(long)]
    pub table: Option<String>,

    /// Override the key column
    #[arg(long)]
    pub key_column: Option<String>,

    /// Override the artifact format (parquet or csv)
    #[arg(long)]
    pub format: Option<OutputFormat>,
}

impl RunArgs {
    fn apply_overrides(&self, config: &mut HighwaterConfig) {
        if let Some(table) = &self.table {
            tracing::info!(table = %table, "Overriding source table from CLI");
            config.source.table = table.clone();
        }
        if let Some(key_column) = &self.key_column {
            tracing::info!(key_column = %key_column, "Overriding key column from CLI");
            config.source.key_column = key_column.clone();
        }
        if let Some(format) = self.format {
            tracing::info!(format = %format, "Overriding artifact format from CLI");
            config.storage.format = format;
        }
        if self.dry_run {
            tracing::info!("Enabling dry-run mode from CLI");
            config.application.dry_run = true;
        }
    }

    /// Execute the run command
    pub async fn execute(
        &self,
        config_path: &str,
        shutdown_signal: watch::Receiver<bool>,
    ) -> anyhow::Result<i32> {
        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                tracing::error!(error = %e, "Failed to load configuration");
                eprintln!("❌ Configuration error: {e}");
                return Ok(2);
            }
        };

        self.apply_overrides(&mut config);
        if let Err(e) = config.validate() {
            tracing::error!(error = %e, "Configuration validation failed");
            eprintln!("❌ Configuration validation failed: {e}");
            return Ok(2);
        }

        let settings = RunSettings::from_config(&config)?;

        if settings.dry_run {
            println!("🔍 DRY RUN MODE - no artifact or checkpoint will be written");
            println!();
        }

        let store = match create_watermark_store(&config).await {
            Ok(s) => s,
            Err(e) => {
                eprintln!("❌ Failed to open checkpoint store: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        let session = match ExtractionSession::connect(&config).await {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "Failed to open extraction session");
                eprintln!("❌ Failed to connect: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        let summary = ExtractionRunner::new(settings, store, Arc::new(session))
            .with_shutdown_signal(shutdown_signal)
            .run()
            .await;

        println!();
        println!("📊 Run Summary:");
        println!("  Source: {}", summary.source);
        if let Some(watermark) = &summary.starting_watermark {
            println!("  Starting watermark: {watermark}");
        }
        println!("  Rows extracted: {}", summary.rows_extracted);
        println!("  Duration: {:.2}s", summary.duration.as_secs_f64());

        match &summary.outcome {
            RunOutcome::NoNewData { .. } => {
                println!("✅ No new data since the last run.");
            }
            RunOutcome::Success {
                rows_written,
                new_watermark,
                artifact,
            } => {
                if summary.dry_run {
                    println!("  Would write: {artifact} ({rows_written} rows)");
                    println!("  Would commit watermark: {}", new_watermark.value);
                } else {
                    println!("  Artifact: {artifact}");
                    println!("  Rows written: {rows_written}");
                    println!("  New watermark: {}", new_watermark.value);
                    println!("✅ Run completed successfully!");
                }
            }
            RunOutcome::Failed { stage, cause } => {
                eprintln!("❌ Run failed during {stage}: {cause}");
                if matches!(stage, RunStage::Commit) {
                    eprintln!(
                        "The artifact was written but the watermark was not advanced; \
                         the next run will export these rows again."
                    );
                }
            }
        }

        Ok(summary.exit_code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overrides_apply() {
        let args = RunArgs {
            dry_run: true,
            table: Some("public.orders".to_string()),
            key_column: Some("order_id".to_string()),
            format: Some(OutputFormat::Csv),
        };
        let mut config = HighwaterConfig::default();
        args.apply_overrides(&mut config);

        assert!(config.application.dry_run);
        assert_eq!(config.source.table, "public.orders");
        assert_eq!(config.source.key_column, "order_id");
        assert_eq!(config.storage.format, OutputFormat::Csv);
    }

    #[test]
    fn test_no_overrides_keep_config() {
        let args = RunArgs {
            dry_run: false,
            table: None,
            key_column: None,
            format: None,
        };
        let mut config = HighwaterConfig::default();
        args.apply_overrides(&mut config);

        assert!(!config.application.dry_run);
        assert_eq!(config.source.table, "public.sales");
    }
}
