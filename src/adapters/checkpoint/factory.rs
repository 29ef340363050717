//! Checkpoint store factory
//!
//! `checkpoint.location` is either a local directory or an
//! `s3://bucket/prefix` URL.

use super::file::FileWatermarkStore;
use super::s3::S3WatermarkStore;
use super::traits::WatermarkStore;
use crate::adapters::s3::build_s3_client;
use crate::config::HighwaterConfig;
use crate::domain::{HighwaterError, Result};
use std::path::PathBuf;
use std::sync::Arc;

/// Parsed checkpoint location
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckpointLocation {
    /// Directory on the local filesystem
    Local(PathBuf),
    /// Bucket and key prefix in S3
    S3 { bucket: String, prefix: String },
}

impl CheckpointLocation {
    /// Parse a configured location
    ///
    /// `s3://` and `s3a://` URLs select S3; anything else is a local path.
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if !(raw.starts_with("s3://") || raw.starts_with("s3a://")) {
            return Ok(Self::Local(PathBuf::from(raw)));
        }

        let url = url::Url::parse(raw).map_err(|e| {
            HighwaterError::Configuration(format!("Invalid checkpoint.location '{raw}': {e}"))
        })?;
        let bucket = url
            .host_str()
            .filter(|b| !b.is_empty())
            .ok_or_else(|| {
                HighwaterError::Configuration(format!(
                    "checkpoint.location '{raw}' does not name a bucket"
                ))
            })?
            .to_string();

        Ok(Self::S3 {
            bucket,
            prefix: url.path().trim_matches('/').to_string(),
        })
    }
}

/// Create the checkpoint store selected by `checkpoint.location`
///
/// # Errors
///
/// Returns an error if the location cannot be parsed or the S3 client
/// cannot be configured.
pub async fn create_watermark_store(config: &HighwaterConfig) -> Result<Arc<dyn WatermarkStore>> {
    match CheckpointLocation::parse(&config.checkpoint.location)? {
        CheckpointLocation::Local(root) => {
            tracing::debug!(root = %root.display(), "Using local checkpoint store");
            Ok(Arc::new(FileWatermarkStore::new(root)))
        }
        CheckpointLocation::S3 { bucket, prefix } => {
            tracing::debug!(bucket = %bucket, prefix = %prefix, "Using S3 checkpoint store");
            let client = build_s3_client(&config.storage).await?;
            Ok(Arc::new(S3WatermarkStore::new(client, bucket, prefix)))
        }
    }
}
