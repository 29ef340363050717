//! Data mover abstraction
//!
//! The runner moves one batch per run through these three calls. Everything
//! behind them (database session, object storage client, encoders) is owned
//! by the implementation.

use crate::config::OutputFormat;
use crate::core::extract::{ArtifactPath, ExtractionBatch};
use crate::core::query::DeltaQuery;
use crate::domain::Result;
use async_trait::async_trait;

/// Moves rows from the source to artifact storage
#[async_trait]
pub trait DataMover: Send + Sync {
    /// Run the delta query and materialize every returned row
    ///
    /// # Errors
    ///
    /// Returns an error for connection, query, or decoding failures,
    /// including a key column that is not integer/timestamp typed.
    async fn extract(&self, query: &DeltaQuery) -> Result<ExtractionBatch>;

    /// Encode `batch` as `format` and write it as a new object at `path`
    ///
    /// Never overwrites an existing artifact. On error, no object may be
    /// left at `path` by this call.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::HighwaterError::Persist`] on encoding or
    /// storage failure.
    async fn persist(
        &self,
        batch: &ExtractionBatch,
        path: &ArtifactPath,
        format: OutputFormat,
    ) -> Result<String>;

    /// Release sessions and connections; safe to call more than once
    async fn shutdown(&self) -> Result<()>;
}
