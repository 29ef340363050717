//! Extracted rows held in memory between extract and persist
//!
//! A batch owns typed cells and its column layout. Construction checks that
//! the key column exists, has an orderable type and holds no nulls, so the
//! largest key of a non-empty batch is always defined.

use crate::core::state::watermark::WatermarkValue;
use crate::domain::ids::{ColumnName, SourceId};
use crate::domain::{HighwaterError, Result};
use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;

/// Logical type of a result column
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnType {
    Boolean,
    Integer,
    Float,
    Decimal,
    Text,
    Timestamp,
    Date,
    Json,
    Uuid,
}

impl ColumnType {
    /// Returns true if a watermark can be taken from this type
    pub fn is_key_type(&self) -> bool {
        matches!(self, Self::Integer | Self::Timestamp)
    }
}

/// A named, typed column of a batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub name: String,
    pub column_type: ColumnType,
}

impl Column {
    pub fn new(name: impl Into<String>, column_type: ColumnType) -> Self {
        Self {
            name: name.into(),
            column_type,
        }
    }
}

/// A single cell value
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Timestamp(DateTime<Utc>),
    Date(NaiveDate),
    Json(serde_json::Value),
    Uuid(uuid::Uuid),
}

impl CellValue {
    /// Watermark value of a key cell, if this cell can be one
    pub fn as_watermark_value(&self) -> Option<WatermarkValue> {
        match self {
            Self::Int(v) => Some(WatermarkValue::Integer(*v)),
            Self::Timestamp(ts) => Some(WatermarkValue::Timestamp(*ts)),
            _ => None,
        }
    }

    /// Returns true for SQL NULL
    pub fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }
}

/// Rows returned by one delta query
#[derive(Debug, Clone, PartialEq)]
pub struct ExtractionBatch {
    source: SourceId,
    columns: Vec<Column>,
    rows: Vec<Vec<CellValue>>,
    key_index: usize,
}

impl ExtractionBatch {
    /// Assemble a batch, validating layout and key cells
    ///
    /// # Errors
    ///
    /// Returns [`HighwaterError::Extract`] if the key column is missing or
    /// not integer/timestamp typed, a row has the wrong width, or a key
    /// cell is null or of the wrong kind.
    pub fn new(
        source: SourceId,
        key_column: &ColumnName,
        columns: Vec<Column>,
        rows: Vec<Vec<CellValue>>,
    ) -> Result<Self> {
        let key_index = columns
            .iter()
            .position(|c| c.name == key_column.as_str())
            .ok_or_else(|| {
                HighwaterError::Extract(format!(
                    "key column '{key_column}' not found in {source}"
                ))
            })?;

        let key_type = columns[key_index].column_type;
        if !key_type.is_key_type() {
            return Err(HighwaterError::Extract(format!(
                "key column '{key_column}' has type {key_type:?}; it must be an integer or timestamp"
            )));
        }

        for (i, row) in rows.iter().enumerate() {
            if row.len() != columns.len() {
                return Err(HighwaterError::Extract(format!(
                    "row {i} has {} cells, expected {}",
                    row.len(),
                    columns.len()
                )));
            }
            let key = &row[key_index];
            let matches_type = matches!(
                (key_type, key),
                (ColumnType::Integer, CellValue::Int(_))
                    | (ColumnType::Timestamp, CellValue::Timestamp(_))
            );
            if !matches_type {
                return Err(HighwaterError::Extract(format!(
                    "row {i} has {} key value in column '{key_column}'",
                    if key.is_null() { "a null" } else { "an invalid" }
                )));
            }
        }

        Ok(Self {
            source,
            columns,
            rows,
            key_index,
        })
    }

    pub fn source(&self) -> &SourceId {
        &self.source
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn rows(&self) -> &[Vec<CellValue>] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Name of the key column
    pub fn key_column(&self) -> &str {
        &self.columns[self.key_index].name
    }

    /// Largest key value in the batch, `None` when empty
    pub fn max_key(&self) -> Option<WatermarkValue> {
        self.rows
            .iter()
            .filter_map(|row| row[self.key_index].as_watermark_value())
            .max()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sales() -> SourceId {
        SourceId::new("public.sales").unwrap()
    }

    fn salesid() -> ColumnName {
        ColumnName::new("salesid").unwrap()
    }

    fn int_columns() -> Vec<Column> {
        vec![
            Column::new("salesid", ColumnType::Integer),
            Column::new("amount", ColumnType::Decimal),
        ]
    }

    #[test]
    fn test_max_key_ignores_row_order() {
        let rows = vec![
            vec![CellValue::Int(7), CellValue::Null],
            vec![CellValue::Int(12), CellValue::Null],
            vec![CellValue::Int(3), CellValue::Null],
        ];
        let batch = ExtractionBatch::new(sales(), &salesid(), int_columns(), rows).unwrap();

        assert_eq!(batch.row_count(), 3);
        assert_eq!(batch.max_key(), Some(WatermarkValue::Integer(12)));
        assert_eq!(batch.key_column(), "salesid");
    }

    #[test]
    fn test_empty_batch_has_no_max() {
        let batch = ExtractionBatch::new(sales(), &salesid(), int_columns(), vec![]).unwrap();
        assert!(batch.is_empty());
        assert_eq!(batch.max_key(), None);
    }

    #[test]
    fn test_timestamp_key() {
        let early = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let late = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
        let columns = vec![Column::new("updated_at", ColumnType::Timestamp)];
        let rows = vec![
            vec![CellValue::Timestamp(late)],
            vec![CellValue::Timestamp(early)],
        ];
        let key = ColumnName::new("updated_at").unwrap();
        let batch = ExtractionBatch::new(sales(), &key, columns, rows).unwrap();

        assert_eq!(batch.max_key(), Some(WatermarkValue::Timestamp(late)));
    }

    #[test]
    fn test_missing_key_column() {
        let columns = vec![Column::new("id", ColumnType::Integer)];
        let err = ExtractionBatch::new(sales(), &salesid(), columns, vec![]).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn test_text_key_column_rejected() {
        let columns = vec![Column::new("salesid", ColumnType::Text)];
        assert!(ExtractionBatch::new(sales(), &salesid(), columns, vec![]).is_err());
    }

    #[test]
    fn test_null_key_rejected() {
        let rows = vec![vec![CellValue::Null, CellValue::Null]];
        let err = ExtractionBatch::new(sales(), &salesid(), int_columns(), rows).unwrap_err();
        assert!(err.to_string().contains("null key"));
    }

    #[test]
    fn test_ragged_row_rejected() {
        let rows = vec![vec![CellValue::Int(1)]];
        assert!(ExtractionBatch::new(sales(), &salesid(), int_columns(), rows).is_err());
    }
}
