//! Checkpoint store abstraction
//!
//! A checkpoint store holds at most one watermark per source table. Reads
//! must never invent a value for a record that exists but cannot be parsed.

use crate::core::state::watermark::Watermark;
use crate::domain::ids::SourceId;
use crate::domain::Result;
use async_trait::async_trait;

/// Durable storage of the last committed watermark per source
#[async_trait]
pub trait WatermarkStore: Send + Sync {
    /// Load the stored watermark for `source`
    ///
    /// Returns `Ok(None)` when no checkpoint has ever been written.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::HighwaterError::CheckpointCorrupt`] if a
    /// checkpoint exists but is unreadable, malformed, or belongs to a
    /// different source.
    async fn load(&self, source: &SourceId) -> Result<Option<Watermark>>;

    /// Durably replace the checkpoint of `watermark.source`
    ///
    /// On success a later [`WatermarkStore::load`] observes exactly this
    /// value. On failure the previous checkpoint is left intact.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::HighwaterError::CheckpointWrite`] if the
    /// medium rejects the write, or when asked to persist the minimum value.
    async fn write(&self, watermark: &Watermark) -> Result<()>;

    /// Human readable location of the checkpoint for `source`
    fn location(&self, source: &SourceId) -> String;

    /// Load the watermark, treating an absent checkpoint as the minimum
    async fn read(&self, source: &SourceId) -> Result<Watermark> {
        Ok(self
            .load(source)
            .await?
            .unwrap_or_else(|| Watermark::initial(source.clone())))
    }
}
