//! Core logic for Highwater.
//!
//! # Modules
//!
//! - [`state`] - Watermark model and the state manager
//! - [`query`] - Delta query construction
//! - [`extract`] - Extraction batches, artifact naming and the run state machine
//!
//! # Run Workflow
//!
//! 1. **Load watermark**: read the checkpoint (absent means "from the beginning")
//! 2. **Extract**: select every row with key above the watermark
//! 3. **Persist**: write the rows as one new artifact
//! 4. **Commit**: replace the checkpoint with the largest key written
//!
//! An empty extract ends the run without writing anything.
//!
//! # Example
//!
//! ```rust,no_run
//! use highwater::adapters::checkpoint::create_watermark_store;
//! use highwater::adapters::mover::ExtractionSession;
//! use highwater::config::load_config;
//! use highwater::core::extract::{ExtractionRunner, RunSettings};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = load_config("highwater.toml")?;
//! let store = create_watermark_store(&config).await?;
//! let mover = Arc::new(ExtractionSession::connect(&config).await?);
//!
//! let summary = ExtractionRunner::new(RunSettings::from_config(&config)?, store, mover)
//!     .run()
//!     .await;
//!
//! std::process::exit(summary.exit_code());
//! # }
//! ```

pub mod extract;
pub mod query;
pub mod state;
