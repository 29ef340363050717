//! Parquet artifact encoding
//!
//! Each batch becomes a single Arrow record batch written as one Snappy
//! compressed Parquet file. Column mapping:
//!
//! | cell type | Arrow type                     |
//! |-----------|--------------------------------|
//! | Boolean   | Boolean                        |
//! | Integer   | Int64                          |
//! | Float     | Float64                        |
//! | Timestamp | Timestamp(Microsecond, "UTC")  |
//! | Date      | Date32                         |
//! | others    | Utf8 (decimals keep full scale) |

use super::csv::cell_to_text;
use crate::core::extract::{CellValue, Column, ColumnType, ExtractionBatch};
use crate::domain::{HighwaterError, Result};
use arrow::array::{
    ArrayRef, BooleanArray, Date32Array, Float64Array, Int64Array, StringArray,
    TimestampMicrosecondArray,
};
use arrow::datatypes::{DataType, Field, Schema, TimeUnit};
use arrow::record_batch::RecordBatch;
use chrono::Datelike;
use parquet::arrow::ArrowWriter;
use parquet::basic::Compression;
use parquet::file::properties::WriterProperties;
use std::sync::Arc;

// Days from 0001-01-01 to 1970-01-01
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

fn arrow_type(column_type: ColumnType) -> DataType {
    match column_type {
        ColumnType::Boolean => DataType::Boolean,
        ColumnType::Integer => DataType::Int64,
        ColumnType::Float => DataType::Float64,
        ColumnType::Timestamp => DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into())),
        ColumnType::Date => DataType::Date32,
        ColumnType::Decimal | ColumnType::Text | ColumnType::Json | ColumnType::Uuid => {
            DataType::Utf8
        }
    }
}

fn mismatch(column: &Column, cell: &CellValue) -> HighwaterError {
    HighwaterError::Persist(format!(
        "column '{}' of type {:?} holds incompatible value {:?}",
        column.name, column.column_type, cell
    ))
}

fn build_array(batch: &ExtractionBatch, index: usize) -> Result<ArrayRef> {
    let column = &batch.columns()[index];
    let cells = batch.rows().iter().map(|row| &row[index]);

    let array: ArrayRef = match column.column_type {
        ColumnType::Boolean => Arc::new(
            cells
                .map(|cell| match cell {
                    CellValue::Null => Ok(None),
                    CellValue::Bool(v) => Ok(Some(*v)),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<BooleanArray>>()?,
        ),
        ColumnType::Integer => Arc::new(
            cells
                .map(|cell| match cell {
                    CellValue::Null => Ok(None),
                    CellValue::Int(v) => Ok(Some(*v)),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Int64Array>>()?,
        ),
        ColumnType::Float => Arc::new(
            cells
                .map(|cell| match cell {
                    CellValue::Null => Ok(None),
                    CellValue::Float(v) => Ok(Some(*v)),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Float64Array>>()?,
        ),
        ColumnType::Timestamp => Arc::new(
            cells
                .map(|cell| match cell {
                    CellValue::Null => Ok(None),
                    CellValue::Timestamp(v) => Ok(Some(v.timestamp_micros())),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<TimestampMicrosecondArray>>()?
                .with_timezone("UTC"),
        ),
        ColumnType::Date => Arc::new(
            cells
                .map(|cell| match cell {
                    CellValue::Null => Ok(None),
                    CellValue::Date(v) => Ok(Some(v.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE)),
                    other => Err(mismatch(column, other)),
                })
                .collect::<Result<Date32Array>>()?,
        ),
        ColumnType::Decimal | ColumnType::Text | ColumnType::Json | ColumnType::Uuid => Arc::new(
            cells
                .map(|cell| match cell {
                    CellValue::Null => None,
                    other => Some(cell_to_text(other)),
                })
                .collect::<StringArray>(),
        ),
    };

    Ok(array)
}

/// Convert a batch to an Arrow record batch
///
/// # Errors
///
/// Returns [`HighwaterError::Persist`] if a cell does not match its
/// column type or Arrow rejects the assembled arrays.
pub fn to_record_batch(batch: &ExtractionBatch) -> Result<RecordBatch> {
    let fields: Vec<Field> = batch
        .columns()
        .iter()
        .map(|c| Field::new(c.name.as_str(), arrow_type(c.column_type), true))
        .collect();
    let schema = Arc::new(Schema::new(fields));

    let arrays = (0..batch.columns().len())
        .map(|i| build_array(batch, i))
        .collect::<Result<Vec<_>>>()?;

    RecordBatch::try_new(schema, arrays)
        .map_err(|e| HighwaterError::Persist(format!("failed to assemble record batch: {e}")))
}

/// Encode a batch as Parquet bytes
///
/// # Errors
///
/// Returns [`HighwaterError::Persist`] if conversion or writing fails.
pub fn encode_parquet(batch: &ExtractionBatch) -> Result<Vec<u8>> {
    let persist = |e: parquet::errors::ParquetError| {
        HighwaterError::Persist(format!("Parquet encoding failed: {e}"))
    };

    let record_batch = to_record_batch(batch)?;
    let props = WriterProperties::builder()
        .set_compression(Compression::SNAPPY)
        .build();

    let mut buffer = Vec::new();
    let mut writer =
        ArrowWriter::try_new(&mut buffer, record_batch.schema(), Some(props)).map_err(persist)?;
    writer.write(&record_batch).map_err(persist)?;
    writer.close().map_err(persist)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ColumnName, SourceId};
    use arrow::array::Array;
    use bytes::Bytes;
    use chrono::{NaiveDate, TimeZone, Utc};
    use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

    fn sample_batch() -> ExtractionBatch {
        let sold_at = Utc.with_ymd_and_hms(2024, 3, 15, 8, 30, 0).unwrap();
        ExtractionBatch::new(
            SourceId::new("public.sales").unwrap(),
            &ColumnName::new("salesid").unwrap(),
            vec![
                Column::new("salesid", ColumnType::Integer),
                Column::new("paid", ColumnType::Boolean),
                Column::new("price", ColumnType::Float),
                Column::new("sold_at", ColumnType::Timestamp),
                Column::new("ship_date", ColumnType::Date),
                Column::new("note", ColumnType::Text),
            ],
            vec![
                vec![
                    CellValue::Int(1),
                    CellValue::Bool(true),
                    CellValue::Float(9.5),
                    CellValue::Timestamp(sold_at),
                    CellValue::Date(NaiveDate::from_ymd_opt(1970, 1, 2).unwrap()),
                    CellValue::Text("first".to_string()),
                ],
                vec![
                    CellValue::Int(2),
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                    CellValue::Null,
                ],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_record_batch_schema() {
        let record_batch = to_record_batch(&sample_batch()).unwrap();
        let schema = record_batch.schema();

        assert_eq!(record_batch.num_rows(), 2);
        assert_eq!(schema.field(0).data_type(), &DataType::Int64);
        assert_eq!(
            schema.field(3).data_type(),
            &DataType::Timestamp(TimeUnit::Microsecond, Some("UTC".into()))
        );
        assert_eq!(schema.field(5).data_type(), &DataType::Utf8);
        assert!(schema.fields().iter().all(|f| f.is_nullable()));
    }

    #[test]
    fn test_date_is_days_since_epoch() {
        let record_batch = to_record_batch(&sample_batch()).unwrap();
        let dates = record_batch
            .column(4)
            .as_any()
            .downcast_ref::<Date32Array>()
            .unwrap();
        assert_eq!(dates.value(0), 1);
        assert!(dates.is_null(1));
    }

    #[test]
    fn test_parquet_reads_back() {
        let bytes = encode_parquet(&sample_batch()).unwrap();

        let reader = ParquetRecordBatchReaderBuilder::try_new(Bytes::from(bytes))
            .unwrap()
            .build()
            .unwrap();
        let batches: Vec<RecordBatch> = reader.map(|b| b.unwrap()).collect();
        let total: usize = batches.iter().map(|b| b.num_rows()).sum();
        assert_eq!(total, 2);

        let ids = batches[0]
            .column(0)
            .as_any()
            .downcast_ref::<Int64Array>()
            .unwrap();
        assert_eq!(ids.value(0), 1);
        assert_eq!(ids.value(1), 2);
    }
}
