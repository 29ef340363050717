//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for Highwater using clap.

pub mod commands;

use clap::{Parser, Subcommand};

/// Highwater - incremental PostgreSQL table export
#[derive(Parser, Debug)]
#[command(name = "highwater")]
#[command(version, about, long_about = None)]
#[command(author = "Highwater Contributors")]
pub struct Cli {
    /// Path to configuration file (optional; defaults and HIGHWATER_* variables apply without it)
    #[arg(short, long, default_value = "highwater.toml", env = "HIGHWATER_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "HIGHWATER_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Extract rows above the stored watermark and write one artifact
    Run(commands::run::RunArgs),

    /// Validate configuration
    ValidateConfig(commands::validate::ValidateArgs),

    /// Show the stored watermark
    Status(commands::status::StatusArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
