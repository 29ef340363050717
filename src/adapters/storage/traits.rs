//! Artifact sink abstraction

use crate::domain::Result;
use async_trait::async_trait;

/// Write-once destination for encoded artifacts
#[async_trait]
pub trait ArtifactSink: Send + Sync {
    /// Create a new object at `key` holding `body`
    ///
    /// Returns the URI of the written object.
    ///
    /// # Errors
    ///
    /// Returns [`crate::domain::HighwaterError::Persist`] if the object
    /// already exists or the write fails.
    async fn put_new(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String>;

    /// URI an object at `key` would have
    fn uri_for(&self, key: &str) -> String;
}
