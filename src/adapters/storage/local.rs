//! Local directory artifact sink

use super::traits::ArtifactSink;
use crate::domain::{HighwaterError, Result};
use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::PathBuf;
use tokio::io::AsyncWriteExt;

/// Writes artifacts under a root directory
#[derive(Debug, Clone)]
pub struct LocalSink {
    root: PathBuf,
}

impl LocalSink {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }
}

#[async_trait]
impl ArtifactSink for LocalSink {
    async fn put_new(&self, key: &str, body: Vec<u8>, _content_type: &str) -> Result<String> {
        let path = self.path_for(key);
        let persist = |e: std::io::Error| HighwaterError::Persist(format!("{}: {e}", path.display()));

        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await.map_err(persist)?;
        }

        let mut file = match tokio::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(&path)
            .await
        {
            Ok(file) => file,
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(HighwaterError::Persist(format!(
                    "artifact {} already exists",
                    path.display()
                )))
            }
            Err(e) => return Err(persist(e)),
        };

        let written = async {
            file.write_all(&body).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            drop(file);
            let _ = tokio::fs::remove_file(&path).await;
            return Err(persist(e));
        }

        Ok(self.uri_for(key))
    }

    fn uri_for(&self, key: &str) -> String {
        self.path_for(key).display().to_string()
    }
}
