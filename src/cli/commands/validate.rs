//! Validate config command implementation
//!
//! This module implements the `validate-config` command for validating
//! the Highwater configuration file.

use crate::config::{load_config_or_default, HighwaterConfig, StorageBackend};
use clap::Args;

/// Arguments for the validate-config command
#[derive(Args, Debug)]
pub struct ValidateArgs {}

impl ValidateArgs {
    /// Execute the validate-config command
    pub async fn execute(&self, config_path: &str) -> anyhow::Result<i32> {
        tracing::info!(config_path = %config_path, "Validating configuration");

        println!("🔍 Validating configuration file: {config_path}");
        println!();

        let config = match load_config_or_default(config_path) {
            Ok(c) => {
                println!("✅ Configuration loaded successfully");
                c
            }
            Err(e) => {
                println!("❌ Failed to load configuration");
                println!("   Error: {e}");
                return Ok(2);
            }
        };

        match config.validate() {
            Ok(()) => {
                println!("✅ Configuration is valid");
                println!();
                Self::print_summary(&config);
                Ok(0)
            }
            Err(e) => {
                println!("❌ Configuration validation failed");
                println!("   Error: {e}");
                println!();
                Ok(2)
            }
        }
    }

    fn print_summary(config: &HighwaterConfig) {
        println!("Configuration Summary:");
        println!("  Log Level: {}", config.application.log_level);
        println!("  Dry Run: {}", config.application.dry_run);
        println!("  Source URL: {}", config.source.url_safe());
        println!("  Source Table: {}", config.source.table);
        println!("  Key Column: {}", config.source.key_column);
        println!("  Max Connections: {}", config.source.max_connections);
        println!("  Format: {}", config.storage.format);
        match config.storage.backend {
            StorageBackend::S3 => {
                println!("  Storage: s3://{}/{}", config.storage.bucket, config.storage.prefix);
                println!("  Endpoint: {}", config.storage.endpoint);
                println!("  Region: {}", config.storage.region);
            }
            StorageBackend::Local => {
                println!(
                    "  Storage: {}/{}",
                    config.storage.local_root.trim_end_matches('/'),
                    config.storage.prefix
                );
            }
        }
        println!("  Checkpoint: {}", config.checkpoint.location);
        println!();
    }
}
