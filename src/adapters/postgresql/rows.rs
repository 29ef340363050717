//! Row decoding from PostgreSQL wire types into batch cells

use crate::core::extract::{CellValue, Column, ColumnType};
use crate::domain::{HighwaterError, Result};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use tokio_postgres::types::{FromSqlOwned, Type};
use tokio_postgres::Row;

/// Logical type for a PostgreSQL column type, if supported
pub fn column_type(pg_type: &Type) -> Option<ColumnType> {
    let column_type = match *pg_type {
        Type::BOOL => ColumnType::Boolean,
        Type::INT2 | Type::INT4 | Type::INT8 => ColumnType::Integer,
        Type::FLOAT4 | Type::FLOAT8 => ColumnType::Float,
        Type::NUMERIC => ColumnType::Decimal,
        Type::TEXT | Type::VARCHAR | Type::BPCHAR | Type::NAME => ColumnType::Text,
        Type::TIMESTAMP | Type::TIMESTAMPTZ => ColumnType::Timestamp,
        Type::DATE => ColumnType::Date,
        Type::JSON | Type::JSONB => ColumnType::Json,
        Type::UUID => ColumnType::Uuid,
        _ => return None,
    };
    Some(column_type)
}

/// Map statement columns to batch columns
///
/// # Errors
///
/// Returns [`HighwaterError::Extract`] naming the first column whose type
/// cannot be represented.
pub fn columns_of(columns: &[tokio_postgres::Column]) -> Result<Vec<Column>> {
    columns
        .iter()
        .map(|c| {
            column_type(c.type_())
                .map(|t| Column::new(c.name(), t))
                .ok_or_else(|| {
                    HighwaterError::Extract(format!(
                        "column '{}' has unsupported type '{}'",
                        c.name(),
                        c.type_()
                    ))
                })
        })
        .collect()
}

fn get<T: FromSqlOwned>(row: &Row, idx: usize) -> Result<Option<T>> {
    row.try_get::<_, Option<T>>(idx).map_err(|e| {
        HighwaterError::Extract(format!(
            "failed to decode column '{}': {e}",
            row.columns()[idx].name()
        ))
    })
}

fn decode_cell(row: &Row, idx: usize, column_type: ColumnType) -> Result<CellValue> {
    let pg_type = row.columns()[idx].type_();

    let cell = match column_type {
        ColumnType::Boolean => get::<bool>(row, idx)?.map(CellValue::Bool),
        ColumnType::Integer => match *pg_type {
            Type::INT2 => get::<i16>(row, idx)?.map(|v| CellValue::Int(i64::from(v))),
            Type::INT4 => get::<i32>(row, idx)?.map(|v| CellValue::Int(i64::from(v))),
            _ => get::<i64>(row, idx)?.map(CellValue::Int),
        },
        ColumnType::Float => match *pg_type {
            Type::FLOAT4 => get::<f32>(row, idx)?.map(|v| CellValue::Float(f64::from(v))),
            _ => get::<f64>(row, idx)?.map(CellValue::Float),
        },
        ColumnType::Decimal => get::<Decimal>(row, idx)?.map(CellValue::Decimal),
        ColumnType::Text => get::<String>(row, idx)?.map(CellValue::Text),
        ColumnType::Timestamp => match *pg_type {
            Type::TIMESTAMP => get::<NaiveDateTime>(row, idx)?
                .map(|v| CellValue::Timestamp(Utc.from_utc_datetime(&v))),
            _ => get::<DateTime<Utc>>(row, idx)?.map(CellValue::Timestamp),
        },
        ColumnType::Date => get::<NaiveDate>(row, idx)?.map(CellValue::Date),
        ColumnType::Json => get::<serde_json::Value>(row, idx)?.map(CellValue::Json),
        ColumnType::Uuid => get::<uuid::Uuid>(row, idx)?.map(CellValue::Uuid),
    };

    Ok(cell.unwrap_or(CellValue::Null))
}

/// Decode every row into cells laid out as `columns`
pub fn decode_rows(rows: &[Row], columns: &[Column]) -> Result<Vec<Vec<CellValue>>> {
    rows.iter()
        .map(|row| {
            columns
                .iter()
                .enumerate()
                .map(|(idx, column)| decode_cell(row, idx, column.column_type))
                .collect()
        })
        .collect()
}
