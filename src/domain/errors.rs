//! Domain error types
//!
//! This module defines the error hierarchy for Highwater. Every stage of a run
//! maps its failures onto one of these variants so the runner can classify a
//! fault without inspecting third-party error types.

use thiserror::Error;

/// Main Highwater error type
///
/// This is the primary error type used throughout the library.
#[derive(Debug, Error)]
pub enum HighwaterError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A checkpoint exists but cannot be read back into a watermark
    #[error("Checkpoint at {location} is corrupt: {reason}")]
    CheckpointCorrupt { location: String, reason: String },

    /// The checkpoint medium rejected a watermark write
    #[error("Checkpoint write failed: {0}")]
    CheckpointWrite(String),

    /// Reading rows from the source failed (connection, query, decoding)
    #[error("Extract error: {0}")]
    Extract(String),

    /// Writing an artifact to storage failed
    #[error("Persist error: {0}")]
    Persist(String),

    /// Session setup failed (pool, object storage client)
    #[error("Connection error: {0}")]
    Connection(String),

    /// The run was stopped by a shutdown signal before persisting
    #[error("Run interrupted: {0}")]
    Interrupted(String),

    /// Serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(String),

    /// Generic errors with context
    #[error("{0}")]
    Other(String),
}

impl HighwaterError {
    /// Shorthand for a corrupt checkpoint error
    pub fn corrupt(location: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::CheckpointCorrupt {
            location: location.into(),
            reason: reason.into(),
        }
    }

    /// Returns true if this error means the checkpoint could not be trusted
    pub fn is_checkpoint_corrupt(&self) -> bool {
        matches!(self, Self::CheckpointCorrupt { .. })
    }
}

// Conversion from std::io::Error
impl From<std::io::Error> for HighwaterError {
    fn from(err: std::io::Error) -> Self {
        HighwaterError::Io(err.to_string())
    }
}

// Conversion from serde_json::Error
impl From<serde_json::Error> for HighwaterError {
    fn from(err: serde_json::Error) -> Self {
        HighwaterError::Serialization(err.to_string())
    }
}

// Conversion from toml parse errors
impl From<toml::de::Error> for HighwaterError {
    fn from(err: toml::de::Error) -> Self {
        HighwaterError::Configuration(format!("TOML parse error: {err}"))
    }
}

impl From<csv::Error> for HighwaterError {
    fn from(err: csv::Error) -> Self {
        HighwaterError::Serialization(format!("CSV error: {err}"))
    }
}
