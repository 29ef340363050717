//! Artifact sinks
//!
//! - [`s3`] - S3 or an S3-compatible service
//! - [`local`] - a local directory

pub mod local;
pub mod s3;
pub mod traits;

pub use local::LocalSink;
pub use s3::S3Sink;
pub use traits::ArtifactSink;

use crate::adapters::s3::build_s3_client;
use crate::config::{StorageBackend, StorageConfig};
use crate::domain::Result;
use std::sync::Arc;

/// Create the sink selected by `storage.backend`
pub async fn create_sink(config: &StorageConfig) -> Result<Arc<dyn ArtifactSink>> {
    match config.backend {
        StorageBackend::S3 => {
            let client = build_s3_client(config).await?;
            tracing::debug!(bucket = %config.bucket, "Using S3 artifact sink");
            Ok(Arc::new(S3Sink::new(client, config.bucket.clone())))
        }
        StorageBackend::Local => {
            tracing::debug!(root = %config.local_root, "Using local artifact sink");
            Ok(Arc::new(LocalSink::new(config.local_root.clone())))
        }
    }
}
