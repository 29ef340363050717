//! In-memory checkpoint store and data mover used by the integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use highwater::adapters::checkpoint::WatermarkStore;
use highwater::adapters::encode::encode_batch;
use highwater::adapters::mover::DataMover;
use highwater::adapters::storage::ArtifactSink;
use highwater::config::OutputFormat;
use highwater::core::extract::{
    ArtifactPath, CellValue, Column, ColumnType, ExtractionBatch, RunSettings,
};
use highwater::core::query::{DeltaQuery, QueryParam};
use highwater::core::state::{Watermark, WatermarkValue};
use highwater::domain::{ColumnName, HighwaterError, Result, SourceId};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn source() -> SourceId {
    SourceId::new("public.sales").unwrap()
}

pub fn settings(key_column: &str) -> RunSettings {
    RunSettings {
        source: source(),
        key_column: ColumnName::new(key_column).unwrap(),
        prefix: "sales-data".to_string(),
        format: OutputFormat::Csv,
        dry_run: false,
    }
}

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

/// Checkpoint store kept in a map, with injectable failures
#[derive(Default)]
pub struct MemoryStore {
    records: Mutex<HashMap<String, Watermark>>,
    pub fail_write: AtomicBool,
    pub corrupt: AtomicBool,
    pub writes: AtomicUsize,
}

impl MemoryStore {
    pub fn with_value(value: WatermarkValue) -> Self {
        let store = Self::default();
        store
            .records
            .lock()
            .unwrap()
            .insert(source().as_str().to_string(), Watermark::new(source(), value));
        store
    }

    pub fn current(&self) -> Option<WatermarkValue> {
        self.records
            .lock()
            .unwrap()
            .get(source().as_str())
            .map(|w| w.value.clone())
    }
}

#[async_trait]
impl WatermarkStore for MemoryStore {
    async fn load(&self, source: &SourceId) -> Result<Option<Watermark>> {
        if self.corrupt.load(Ordering::SeqCst) {
            return Err(HighwaterError::corrupt(
                self.location(source),
                "expected header 'max_id,table_name'",
            ));
        }
        Ok(self.records.lock().unwrap().get(source.as_str()).cloned())
    }

    async fn write(&self, watermark: &Watermark) -> Result<()> {
        if self.fail_write.load(Ordering::SeqCst) {
            return Err(HighwaterError::CheckpointWrite(
                "checkpoint medium unavailable".to_string(),
            ));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .unwrap()
            .insert(watermark.source.as_str().to_string(), watermark.clone());
        Ok(())
    }

    fn location(&self, source: &SourceId) -> String {
        format!("memory://max_id/{}.csv", source.as_str())
    }
}

/// An artifact recorded by [`MemoryMover::persist`]
#[derive(Debug, Clone)]
pub struct PersistedArtifact {
    pub path: String,
    pub format: OutputFormat,
    pub keys: Vec<WatermarkValue>,
}

/// Data mover over an in-memory table with injectable failures
pub struct MemoryMover {
    columns: Vec<Column>,
    rows: Mutex<Vec<Vec<CellValue>>>,
    key_index: usize,
    pub persisted: Mutex<Vec<PersistedArtifact>>,
    pub fail_extract: AtomicBool,
    pub fail_persist: AtomicBool,
    pub fail_connection: AtomicBool,
    pub extract_calls: AtomicUsize,
    pub shutdown_calls: AtomicUsize,
    pub queries: Mutex<Vec<DeltaQuery>>,
    sink: Option<Arc<dyn ArtifactSink>>,
}

impl MemoryMover {
    /// Table `(salesid bigint, item text)` holding the given ids
    pub fn with_integer_keys(ids: &[i64]) -> Self {
        let rows = ids
            .iter()
            .map(|id| vec![CellValue::Int(*id), CellValue::Text(format!("item-{id}"))])
            .collect();
        Self::new(
            vec![
                Column::new("salesid", ColumnType::Integer),
                Column::new("item", ColumnType::Text),
            ],
            rows,
            0,
        )
    }

    /// Table `(id bigint, updated_at timestamptz)` with one row per offset
    pub fn with_timestamp_keys(offsets: &[i64]) -> Self {
        let rows = offsets
            .iter()
            .enumerate()
            .map(|(i, s)| vec![CellValue::Int(i as i64), CellValue::Timestamp(ts(*s))])
            .collect();
        Self::new(
            vec![
                Column::new("id", ColumnType::Integer),
                Column::new("updated_at", ColumnType::Timestamp),
            ],
            rows,
            1,
        )
    }

    fn new(columns: Vec<Column>, rows: Vec<Vec<CellValue>>, key_index: usize) -> Self {
        Self {
            columns,
            rows: Mutex::new(rows),
            key_index,
            persisted: Mutex::new(Vec::new()),
            fail_extract: AtomicBool::new(false),
            fail_persist: AtomicBool::new(false),
            fail_connection: AtomicBool::new(false),
            extract_calls: AtomicUsize::new(0),
            shutdown_calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
            sink: None,
        }
    }

    /// Encode and write artifacts through `sink` in addition to recording them
    pub fn with_sink(mut self, sink: Arc<dyn ArtifactSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Append rows with integer keys after the table was created
    pub fn insert_integer_keys(&self, ids: &[i64]) {
        let mut rows = self.rows.lock().unwrap();
        for id in ids {
            rows.push(vec![CellValue::Int(*id), CellValue::Text(format!("item-{id}"))]);
        }
    }

    pub fn persisted(&self) -> Vec<PersistedArtifact> {
        self.persisted.lock().unwrap().clone()
    }
}

#[async_trait]
impl DataMover for MemoryMover {
    async fn extract(&self, query: &DeltaQuery) -> Result<ExtractionBatch> {
        self.extract_calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.clone());

        if self.fail_connection.load(Ordering::SeqCst) {
            return Err(HighwaterError::Connection("connection refused".to_string()));
        }
        if self.fail_extract.load(Ordering::SeqCst) {
            return Err(HighwaterError::Extract("relation does not exist".to_string()));
        }

        let lower = match query.params.first() {
            Some(QueryParam::Integer(v)) => WatermarkValue::Integer(*v),
            Some(QueryParam::Timestamp(t)) => WatermarkValue::Timestamp(*t),
            None => WatermarkValue::Minimum,
        };

        let mut rows: Vec<Vec<CellValue>> = self
            .rows
            .lock()
            .unwrap()
            .iter()
            .filter(|row| {
                row[self.key_index]
                    .as_watermark_value()
                    .is_some_and(|k| k > lower)
            })
            .cloned()
            .collect();
        rows.sort_by_key(|row| row[self.key_index].as_watermark_value());

        ExtractionBatch::new(
            query.source.clone(),
            &query.key_column,
            self.columns.clone(),
            rows,
        )
    }

    async fn persist(
        &self,
        batch: &ExtractionBatch,
        path: &ArtifactPath,
        format: OutputFormat,
    ) -> Result<String> {
        if self.fail_persist.load(Ordering::SeqCst) {
            return Err(HighwaterError::Persist("bucket not writable".to_string()));
        }

        let location = match &self.sink {
            Some(sink) => {
                let body = encode_batch(batch, format)?;
                sink.put_new(path.as_str(), body, format.content_type())
                    .await?
            }
            None => format!("memory://{path}"),
        };

        let keys = batch
            .rows()
            .iter()
            .filter_map(|row| row[self.key_index].as_watermark_value())
            .collect();
        self.persisted.lock().unwrap().push(PersistedArtifact {
            path: path.as_str().to_string(),
            format,
            keys,
        });
        Ok(location)
    }

    async fn shutdown(&self) -> Result<()> {
        self.shutdown_calls.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}
