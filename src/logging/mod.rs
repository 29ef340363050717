//! Logging and observability
//!
//! Structured logging through `tracing`, with console output and optional
//! rolling JSON files.
//!
//! # Example
//!
//! ```no_run
//! use highwater::logging::init_logging;
//! use highwater::config::LoggingConfig;
//!
//! let config = LoggingConfig::default();
//! let _guard = init_logging("info", &config).expect("Failed to initialize logging");
//!
//! tracing::info!("Application started");
//! ```

pub mod structured;

pub use structured::{init_logging, LoggingGuard};

/// Log the start of an extraction run
///
/// # Example
///
/// ```no_run
/// use highwater::log_run_start;
///
/// log_run_start!("public.sales", "salesid", false);
/// ```
#[macro_export]
macro_rules! log_run_start {
    ($source:expr, $key_column:expr, $dry_run:expr) => {
        tracing::info!(
            source = %$source,
            key_column = %$key_column,
            dry_run = $dry_run,
            "Starting extraction run"
        );
    };
}

/// Log a state transition of the extraction runner
#[macro_export]
macro_rules! log_stage_transition {
    ($from:expr, $to:expr) => {
        tracing::debug!(from = ?$from, to = ?$to, "Run state transition");
    };
}

/// Log an error with context
///
/// # Example
///
/// ```no_run
/// use highwater::log_error_with_context;
/// use highwater::domain::HighwaterError;
///
/// let error = HighwaterError::Configuration("Invalid config".to_string());
/// log_error_with_context!(&error, "Failed to load configuration");
/// ```
#[macro_export]
macro_rules! log_error_with_context {
    ($error:expr, $context:expr) => {
        tracing::error!(
            error = %$error,
            context = %$context,
            "Error occurred"
        );
    };
}
