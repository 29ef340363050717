//! Local filesystem checkpoint store
//!
//! Checkpoints live at `{root}/max_id/{source}.csv`. Writes go to a sibling
//! temporary file that is fsynced and then renamed over the target, so a
//! reader sees either the old record or the new one.

use super::record;
use super::traits::WatermarkStore;
use crate::core::state::watermark::Watermark;
use crate::domain::ids::SourceId;
use crate::domain::{HighwaterError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;

/// Watermark store backed by a local directory
#[derive(Debug, Clone)]
pub struct FileWatermarkStore {
    root: PathBuf,
}

impl FileWatermarkStore {
    /// Create a store rooted at `root`; nothing is touched until the first write
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Path of the checkpoint file for `source`
    pub fn path_for(&self, source: &SourceId) -> PathBuf {
        self.root
            .join("max_id")
            .join(format!("{}.csv", source.as_str()))
    }

    async fn write_atomically(&self, target: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let dir = target.parent().unwrap_or(&self.root);
        tokio::fs::create_dir_all(dir).await?;

        let file_name = target
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = dir.join(format!(".{file_name}.{}.tmp", uuid::Uuid::new_v4()));

        let result = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            drop(file);
            tokio::fs::rename(&tmp, target).await
        }
        .await;

        if result.is_err() {
            let _ = tokio::fs::remove_file(&tmp).await;
        }
        result
    }
}

#[async_trait]
impl WatermarkStore for FileWatermarkStore {
    async fn load(&self, source: &SourceId) -> Result<Option<Watermark>> {
        let path = self.path_for(source);
        let location = path.display().to_string();

        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!(location = %location, "No checkpoint file found");
                return Ok(None);
            }
            Err(e) => {
                return Err(HighwaterError::corrupt(
                    location,
                    format!("checkpoint exists but cannot be read: {e}"),
                ))
            }
        };

        record::decode(&bytes, source, &location).map(Some)
    }

    async fn write(&self, watermark: &Watermark) -> Result<()> {
        let bytes = record::encode(watermark)?;
        let path = self.path_for(&watermark.source);

        self.write_atomically(&path, &bytes).await.map_err(|e| {
            HighwaterError::CheckpointWrite(format!("{}: {e}", path.display()))
        })?;

        tracing::debug!(
            location = %path.display(),
            watermark = %watermark.value,
            "Checkpoint file replaced"
        );
        Ok(())
    }

    fn location(&self, source: &SourceId) -> String {
        self.path_for(source).display().to_string()
    }
}
