//! S3 artifact sink
//!
//! Uploads use a conditional PutObject (`If-None-Match: *`), so an existing
//! object is never replaced.

use super::traits::ArtifactSink;
use crate::domain::{HighwaterError, Result};
use async_trait::async_trait;
use aws_sdk_s3::error::{DisplayErrorContext, ProvideErrorMetadata, SdkError};
use aws_sdk_s3::primitives::ByteStream;

/// Writes artifacts to one bucket
#[derive(Debug, Clone)]
pub struct S3Sink {
    client: aws_sdk_s3::Client,
    bucket: String,
}

impl S3Sink {
    pub fn new(client: aws_sdk_s3::Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }
}

#[async_trait]
impl ArtifactSink for S3Sink {
    async fn put_new(&self, key: &str, body: Vec<u8>, content_type: &str) -> Result<String> {
        let uri = self.uri_for(key);
        let size = body.len();

        let result = self
            .client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .content_type(content_type)
            .if_none_match("*")
            .body(ByteStream::from(body))
            .send()
            .await;

        match result {
            Ok(_) => {
                tracing::debug!(uri = %uri, bytes = size, "Uploaded artifact");
                Ok(uri)
            }
            Err(SdkError::ServiceError(ctx)) if ctx.err().code() == Some("PreconditionFailed") => {
                Err(HighwaterError::Persist(format!("artifact {uri} already exists")))
            }
            Err(e) => Err(HighwaterError::Persist(format!(
                "upload to {uri} failed: {}",
                DisplayErrorContext(&e)
            ))),
        }
    }

    fn uri_for(&self, key: &str) -> String {
        format!("s3://{}/{}", self.bucket, key)
    }
}
