// Highwater - Incremental PostgreSQL export tool
// Copyright (c) 2025 Highwater Contributors
// Licensed under the MIT License

//! # Highwater - incremental PostgreSQL export
//!
//! Highwater copies the rows of one PostgreSQL table that are new since its
//! previous run into a single Parquet or CSV artifact in object storage (or a
//! local directory), then records the largest key it exported as the new
//! high-water mark.
//!
//! ## Overview
//!
//! One run:
//! - **Loads** the watermark from the checkpoint (a two-line CSV file)
//! - **Extracts** every row whose key column is above it, ordered by key
//! - **Persists** the rows as one new, uniquely named artifact
//! - **Commits** the largest key as the new watermark
//!
//! A run that finds no new rows writes nothing. A run that fails before the
//! commit leaves the watermark where it was, so the next run retries the same
//! range.
//!
//! ## Architecture
//!
//! - [`cli`] - Command-line interface and argument parsing
//! - [`core`] - Watermarks, delta queries and the run state machine
//! - [`adapters`] - PostgreSQL, checkpoint stores, artifact sinks, encoders
//! - [`domain`] - Error type and validated identifiers
//! - [`config`] - Configuration management
//! - [`logging`] - Structured logging
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use highwater::adapters::checkpoint::create_watermark_store;
//! use highwater::adapters::mover::ExtractionSession;
//! use highwater::config::load_config_or_default;
//! use highwater::core::extract::{ExtractionRunner, RunSettings};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = load_config_or_default("highwater.toml")?;
//!     let store = create_watermark_store(&config).await?;
//!     let session = Arc::new(ExtractionSession::connect(&config).await?);
//!
//!     let summary = ExtractionRunner::new(RunSettings::from_config(&config)?, store, session)
//!         .run()
//!         .await;
//!
//!     println!("Extracted {} rows", summary.rows_extracted);
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! Library code returns [`domain::HighwaterError`]; each variant maps to a
//! process exit code through [`core::extract::error_exit_code`].

pub mod adapters;
pub mod cli;
pub mod config;
pub mod core;
pub mod domain;
pub mod logging;
