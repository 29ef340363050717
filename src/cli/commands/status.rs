//! Status command implementation
//!
//! This module implements the `status` command for displaying the
//! stored watermark of the configured source.

use crate::adapters::checkpoint::create_watermark_store;
use crate::config::load_config_or_default;
use crate::core::extract::error_exit_code;
use crate::core::state::StateManager;
use clap::Args;

/// Arguments for the status command
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Inspect a different table than the configured one
    #[arg(long)]
    pub table: Option<String>,
}

impl StatusArgs {
    /// Execute the status command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!("Checking watermark status");

        println!("📊 Watermark Status");
        println!();

        let mut config = match load_config_or_default(config_path) {
            Ok(c) => c,
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };
        if let Some(table) = &self.table {
            config.source.table = table.clone();
        }

        let source = match config.source.source_id() {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Invalid source table");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        let store = match create_watermark_store(&config).await {
            Ok(s) => s,
            Err(e) => {
                println!("❌ Failed to open checkpoint store");
                println!("   Error: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        let manager = StateManager::new(store);
        println!("Checkpoint: {}", manager.location(&source));

        let watermark = match manager.read(&source).await {
            Ok(w) => w,
            Err(e) => {
                println!("❌ Failed to read watermark");
                println!("   Error: {e}");
                return Ok(error_exit_code(&e));
            }
        };

        println!("Source: {source}");
        if watermark.is_initial() {
            println!("No watermark recorded yet.");
            println!("Run 'highwater run' to perform the first extraction.");
        } else {
            println!("Watermark: {}", watermark.value);
        }
        println!();

        Ok(0)
    }
}
