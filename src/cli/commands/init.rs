//! Init command implementation
//!
//! This module implements the `init` command for generating a sample
//! configuration file.

use clap::Args;
use std::fs;
use std::path::Path;

/// Arguments for the init command
#[derive(Args, Debug)]
pub struct InitArgs {
    /// Path where to create the configuration file
    #[arg(short, long, default_value = "highwater.toml")]
    pub output: String,

    /// Include explanatory comments for every option
    #[arg(long)]
    pub with_examples: bool,

    /// Overwrite existing file
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub async fn execute(&self) -> anyhow::Result<i32> {
        tracing::info!(output = %self.output, "Initializing configuration file");

        println!("📝 Initializing Highwater configuration");
        println!();

        if Path::new(&self.output).exists() && !self.force {
            println!("❌ Configuration file already exists: {}", self.output);
            println!("   Use --force to overwrite");
            return Ok(2);
        }

        let content = if self.with_examples {
            Self::generate_config_with_examples()
        } else {
            Self::generate_minimal_config()
        };

        match fs::write(&self.output, content) {
            Ok(()) => {
                println!("✅ Configuration file created: {}", self.output);
                println!();
                println!("Next steps:");
                println!("  1. Edit {} with your settings", self.output);
                println!("  2. Export HIGHWATER_SOURCE_PASSWORD (or put it in .env)");
                println!("  3. Validate configuration: highwater validate-config");
                println!("  4. Preview a run: highwater run --dry-run");
                println!("  5. Run: highwater run");
                println!();
                Ok(0)
            }
            Err(e) => {
                println!("❌ Failed to write configuration file");
                println!("   Error: {e}");
                Ok(5)
            }
        }
    }

    fn generate_minimal_config() -> String {
        r#"# Highwater Configuration File
# Incremental PostgreSQL export

[application]
log_level = "info"
dry_run = false

[source]
url = "postgresql://localhost:5432/warehouse"
username = "postgres"
password = "${HIGHWATER_SOURCE_PASSWORD}"
table = "public.sales"
key_column = "salesid"

[storage]
backend = "s3"
bucket = "my-data-bucket"
prefix = "sales-data"
format = "parquet"
endpoint = "s3.amazonaws.com"
region = "us-east-1"

[checkpoint]
location = "./checkpoint"

[logging]
local_enabled = false
local_path = "./logs"
local_rotation = "daily"
"#
        .to_string()
    }

    fn generate_config_with_examples() -> String {
        r#"# Highwater Configuration File
# Incremental PostgreSQL export
#
# Every value below can be overridden with an environment variable named
# HIGHWATER_<SECTION>_<KEY>, e.g. HIGHWATER_SOURCE_TABLE or
# HIGHWATER_STORAGE_BUCKET. ${VAR} references are substituted on load.

# ============================================================================
# Application Settings
# ============================================================================
[application]
# Log level (trace, debug, info, warn, error)
log_level = "info"

# Dry run: extract and report, but write neither artifact nor checkpoint
dry_run = false

# ============================================================================
# Source Database
# ============================================================================
[source]
# PostgreSQL URL; a leading "jdbc:" is accepted
url = "postgresql://localhost:5432/warehouse"

# Credentials, used when the URL does not carry them
username = "postgres"
password = "${HIGHWATER_SOURCE_PASSWORD}"

# Table to export, optionally schema qualified
table = "public.sales"

# Monotonically increasing integer or timestamp column
key_column = "salesid"

# Connection pool size (1-100)
max_connections = 4

# Connection timeout in seconds
connection_timeout_seconds = 30

# Statement timeout in seconds (0 disables it)
statement_timeout_seconds = 0

# SSL mode (disable, allow, prefer, require, verify-ca, verify-full)
ssl_mode = "prefer"

# ============================================================================
# Artifact Storage
# ============================================================================
[storage]
# Backend: s3 or local
backend = "s3"

# Bucket and key prefix; artifacts are named {prefix}/{table}_{timestamp}.{ext}
bucket = "my-data-bucket"
prefix = "sales-data"

# Format: parquet or csv
format = "parquet"

# S3 endpoint; set a host or URL for S3-compatible services such as MinIO
endpoint = "s3.amazonaws.com"
region = "us-east-1"

# Static credentials; when omitted the default AWS credential chain is used
# access_key_id = "${HIGHWATER_STORAGE_ACCESS_KEY_ID}"
# secret_access_key = "${HIGHWATER_STORAGE_SECRET_ACCESS_KEY}"

# Path-style addressing (needed by most S3-compatible services)
path_style = true

# Root directory when backend = "local"
local_root = "./output"

# ============================================================================
# Checkpoint
# ============================================================================
[checkpoint]
# Local directory or s3://bucket/prefix
# The watermark is stored at {location}/max_id/{table}.csv
location = "./checkpoint"

# ============================================================================
# Logging
# ============================================================================
[logging]
# JSON log files in addition to console output
local_enabled = false
local_path = "./logs"

# Rotation: daily, hourly, never
local_rotation = "daily"
"#
        .to_string()
    }
}
