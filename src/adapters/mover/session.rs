//! Extraction session: the production [`DataMover`]
//!
//! Owns the database pool and the artifact sink for one run.

use super::traits::DataMover;
use crate::adapters::encode::encode_batch;
use crate::adapters::postgresql::{PostgreSQLClient, PostgreSQLSource};
use crate::adapters::storage::{create_sink, ArtifactSink};
use crate::config::{HighwaterConfig, OutputFormat};
use crate::core::extract::{ArtifactPath, ExtractionBatch};
use crate::core::query::DeltaQuery;
use crate::domain::{HighwaterError, Result};
use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Database pool plus artifact sink
pub struct ExtractionSession {
    source: PostgreSQLSource,
    sink: Arc<dyn ArtifactSink>,
    closed: AtomicBool,
}

impl ExtractionSession {
    /// Assemble a session from parts
    pub fn new(source: PostgreSQLSource, sink: Arc<dyn ArtifactSink>) -> Self {
        Self {
            source,
            sink,
            closed: AtomicBool::new(false),
        }
    }

    /// Open the pool, verify the database is reachable and build the sink
    ///
    /// # Errors
    ///
    /// Returns [`HighwaterError::Connection`] if the database cannot be
    /// reached, or a configuration error for invalid settings.
    pub async fn connect(config: &HighwaterConfig) -> Result<Self> {
        let client = PostgreSQLClient::new(&config.source)?;
        client.test_connection().await?;
        tracing::info!(endpoint = %client.endpoint(), "Connected to source database");

        let sink = create_sink(&config.storage).await?;
        Ok(Self::new(PostgreSQLSource::new(client), sink))
    }
}

#[async_trait]
impl DataMover for ExtractionSession {
    async fn extract(&self, query: &DeltaQuery) -> Result<ExtractionBatch> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(HighwaterError::Extract("session is shut down".to_string()));
        }
        self.source.extract(query).await
    }

    async fn persist(
        &self,
        batch: &ExtractionBatch,
        path: &ArtifactPath,
        format: OutputFormat,
    ) -> Result<String> {
        if self.closed.load(Ordering::SeqCst) {
            return Err(HighwaterError::Persist("session is shut down".to_string()));
        }

        let body = encode_batch(batch, format)?;
        tracing::debug!(
            rows = batch.row_count(),
            bytes = body.len(),
            format = %format,
            "Encoded artifact"
        );

        self.sink
            .put_new(path.as_str(), body, format.content_type())
            .await
    }

    async fn shutdown(&self) -> Result<()> {
        if self.closed.swap(true, Ordering::SeqCst) {
            return Ok(());
        }
        self.source.client().close();
        tracing::debug!("Extraction session closed");
        Ok(())
    }
}
