//! Configuration management for Highwater.
//!
//! # Overview
//!
//! Highwater reads a TOML configuration file (or JSON, by extension) with
//! support for:
//! - Environment variable substitution (`${VAR_NAME}`)
//! - `HIGHWATER_<SECTION>_<KEY>` environment overrides
//! - Defaults for every setting, so the file itself is optional
//! - Validation before any connection is made
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use highwater::config::load_config;
//!
//! # fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("highwater.toml")?;
//!
//! println!("Source table: {}", config.source.table);
//! println!("Artifacts: {}/{}", config.storage.bucket, config.storage.prefix);
//! # Ok(())
//! # }
//! ```
//!
//! # Example Configuration
//!
//! ```toml
//! [source]
//! url = "postgresql://warehouse.internal:5432/analytics"
//! username = "etl"
//! password = "${HIGHWATER_DB_PASSWORD}"
//! table = "public.sales"
//! key_column = "salesid"
//!
//! [storage]
//! backend = "s3"
//! bucket = "my-data-bucket"
//! prefix = "sales-data"
//! format = "parquet"
//!
//! [checkpoint]
//! location = "./checkpoint"
//! ```

pub mod loader;
pub mod schema;
pub mod secret;

// Re-export commonly used types
pub use loader::{load_config, load_config_or_default};
pub use schema::{
    ApplicationConfig, CheckpointConfig, HighwaterConfig, LoggingConfig, OutputFormat,
    SourceConfig, StorageBackend, StorageConfig,
};
pub use secret::{secret_string, secret_string_opt, SecretString, SecretValue};
