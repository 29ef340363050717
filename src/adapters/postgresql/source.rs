//! PostgreSQL extraction source

use super::client::PostgreSQLClient;
use super::rows::{columns_of, decode_rows};
use crate::core::extract::ExtractionBatch;
use crate::core::query::{DeltaQuery, QueryParam};
use crate::domain::Result;
use std::time::Instant;
use tokio_postgres::types::ToSql;

fn bind(param: &QueryParam) -> &(dyn ToSql + Sync) {
    match param {
        QueryParam::Integer(v) => v as &(dyn ToSql + Sync),
        QueryParam::Timestamp(ts) => ts as &(dyn ToSql + Sync),
    }
}

/// Runs delta queries and materializes batches
pub struct PostgreSQLSource {
    client: PostgreSQLClient,
}

impl PostgreSQLSource {
    pub fn new(client: PostgreSQLClient) -> Self {
        Self { client }
    }

    pub fn client(&self) -> &PostgreSQLClient {
        &self.client
    }

    /// Execute `query` and decode every returned row
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails, a column type is unsupported,
    /// or the key column is missing, non-orderable, or null in some row.
    pub async fn extract(&self, query: &DeltaQuery) -> Result<ExtractionBatch> {
        let started = Instant::now();
        let params: Vec<&(dyn ToSql + Sync)> = query.params.iter().map(bind).collect();

        let (statement, rows) = self.client.query(&query.sql, &params).await?;
        let columns = columns_of(statement.columns())?;
        let cells = decode_rows(&rows, &columns)?;

        let batch =
            ExtractionBatch::new(query.source.clone(), &query.key_column, columns, cells)?;

        tracing::info!(
            source = %query.source,
            rows = batch.row_count(),
            duration_ms = started.elapsed().as_millis(),
            "Extracted rows"
        );
        Ok(batch)
    }
}
