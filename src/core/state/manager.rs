//! State manager for watermark persistence
//!
//! Wraps a [`WatermarkStore`] with the rules the runner relies on: an absent
//! checkpoint reads as the minimum, and a commit never moves a watermark
//! backwards.

use crate::adapters::checkpoint::WatermarkStore;
use crate::core::state::watermark::Watermark;
use crate::domain::ids::SourceId;
use crate::domain::{HighwaterError, Result};
use std::sync::Arc;

/// State manager for watermark persistence
pub struct StateManager {
    store: Arc<dyn WatermarkStore>,
}

impl StateManager {
    /// Create a new StateManager over a checkpoint store
    pub fn new(store: Arc<dyn WatermarkStore>) -> Self {
        Self { store }
    }

    /// Load the current watermark of `source`
    ///
    /// # Errors
    ///
    /// Propagates the store's error; a corrupt checkpoint is never replaced
    /// by the minimum.
    pub async fn read(&self, source: &SourceId) -> Result<Watermark> {
        let watermark = self.store.read(source).await?;

        if watermark.is_initial() {
            tracing::info!(
                source = %source,
                location = %self.store.location(source),
                "No checkpoint found, extracting from the beginning"
            );
        } else {
            tracing::info!(
                source = %source,
                watermark = %watermark.value,
                "Loaded watermark"
            );
        }

        Ok(watermark)
    }

    /// Commit `next`, which must not be below `previous`
    ///
    /// # Errors
    ///
    /// Returns [`HighwaterError::CheckpointWrite`] if `next` would regress
    /// the watermark or the store rejects the write.
    pub async fn commit(&self, previous: &Watermark, next: &Watermark) -> Result<()> {
        if next.source != previous.source {
            return Err(HighwaterError::CheckpointWrite(format!(
                "watermark for '{}' cannot replace the one for '{}'",
                next.source, previous.source
            )));
        }
        if next.value < previous.value {
            return Err(HighwaterError::CheckpointWrite(format!(
                "refusing to move watermark of '{}' backwards from {} to {}",
                next.source, previous.value, next.value
            )));
        }

        tracing::info!(
            source = %next.source,
            from = %previous.value,
            to = %next.value,
            "Committing watermark"
        );

        self.store.write(next).await
    }

    /// Location of the checkpoint of `source`, for messages
    pub fn location(&self, source: &SourceId) -> String {
        self.store.location(source)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::checkpoint::FileWatermarkStore;
    use crate::core::state::watermark::WatermarkValue;
    use tempfile::TempDir;

    fn sales() -> SourceId {
        SourceId::new("public.sales").unwrap()
    }

    fn manager(dir: &TempDir) -> StateManager {
        StateManager::new(Arc::new(FileWatermarkStore::new(dir.path())))
    }

    #[tokio::test]
    async fn test_read_absent_is_initial() {
        let dir = TempDir::new().unwrap();
        assert!(manager(&dir).read(&sales()).await.unwrap().is_initial());
    }

    #[tokio::test]
    async fn test_commit_advances() {
        let dir = TempDir::new().unwrap();
        let state = manager(&dir);
        let initial = Watermark::initial(sales());
        let next = Watermark::new(sales(), WatermarkValue::Integer(10));

        state.commit(&initial, &next).await.unwrap();
        assert_eq!(state.read(&sales()).await.unwrap(), next);
    }

    #[tokio::test]
    async fn test_commit_refuses_regression() {
        let dir = TempDir::new().unwrap();
        let state = manager(&dir);
        let previous = Watermark::new(sales(), WatermarkValue::Integer(10));
        let lower = Watermark::new(sales(), WatermarkValue::Integer(9));

        let err = state.commit(&previous, &lower).await.unwrap_err();
        assert!(matches!(err, HighwaterError::CheckpointWrite(_)));
        assert!(state.read(&sales()).await.unwrap().is_initial());
    }

    #[tokio::test]
    async fn test_commit_refuses_other_source() {
        let dir = TempDir::new().unwrap();
        let state = manager(&dir);
        let previous = Watermark::initial(sales());
        let other = Watermark::new(SourceId::new("orders").unwrap(), WatermarkValue::Integer(1));

        assert!(state.commit(&previous, &other).await.is_err());
    }
}
