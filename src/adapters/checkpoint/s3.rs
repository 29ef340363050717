//! S3 checkpoint store
//!
//! The checkpoint for `public.sales` under `s3://bucket/prefix` is the object
//! `prefix/max_id/public.sales.csv`. A single PutObject replaces it, which S3
//! applies atomically.

use super::record;
use super::traits::WatermarkStore;
use crate::adapters::s3::join_key;
use crate::core::state::watermark::Watermark;
use crate::domain::ids::SourceId;
use crate::domain::{HighwaterError, Result};
use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, SdkError};
use aws_sdk_s3::primitives::ByteStream;

/// Watermark store backed by an S3 bucket
#[derive(Debug, Clone)]
pub struct S3WatermarkStore {
    client: aws_sdk_s3::Client,
    bucket: String,
    prefix: String,
}

impl S3WatermarkStore {
    /// Create a store for `s3://{bucket}/{prefix}`
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    fn key_for(&self, source: &SourceId) -> String {
        join_key(&self.prefix, &format!("max_id/{}.csv", source.as_str()))
    }
}

#[async_trait]
impl WatermarkStore for S3WatermarkStore {
    async fn load(&self, source: &SourceId) -> Result<Option<Watermark>> {
        let key = self.key_for(source);
        let location = self.location(source);

        let response = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(&key)
            .send()
            .await
        {
            Ok(response) => response,
            Err(SdkError::ServiceError(ctx)) => {
                let err = ctx.into_err();
                if err.is_no_such_key() {
                    tracing::debug!(location = %location, "No checkpoint object found");
                    return Ok(None);
                }
                return Err(HighwaterError::corrupt(
                    location,
                    format!(
                        "checkpoint exists but cannot be read: {}",
                        DisplayErrorContext(&err)
                    ),
                ));
            }
            Err(e) => {
                return Err(HighwaterError::Connection(format!(
                    "failed to reach checkpoint {location}: {}",
                    DisplayErrorContext(&e)
                )))
            }
        };

        let bytes = response
            .body
            .collect()
            .await
            .map_err(|e| {
                HighwaterError::corrupt(&location, format!("failed to read object body: {e}"))
            })?
            .into_bytes();

        record::decode(&bytes, source, &location).map(Some)
    }

    async fn write(&self, watermark: &Watermark) -> Result<()> {
        let bytes = record::encode(watermark)?;
        let key = self.key_for(&watermark.source);

        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(&key)
            .content_type("text/csv")
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| {
                HighwaterError::CheckpointWrite(format!(
                    "s3://{}/{key}: {}",
                    self.bucket,
                    DisplayErrorContext(&e)
                ))
            })?;

        tracing::debug!(
            location = %self.location(&watermark.source),
            watermark = %watermark.value,
            "Checkpoint object replaced"
        );
        Ok(())
    }

    fn location(&self, source: &SourceId) -> String {
        format!("s3://{}/{}", self.bucket, self.key_for(source))
    }
}
