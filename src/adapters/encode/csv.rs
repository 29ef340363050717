//! CSV artifact encoding
//!
//! Header row of column names, then one record per row. NULL is an empty
//! field, timestamps are RFC 3339 UTC with microseconds, dates `YYYY-MM-DD`.

use crate::core::extract::{CellValue, ExtractionBatch};
use crate::domain::{HighwaterError, Result};
use chrono::SecondsFormat;
use csv::Writer;

/// Text form of a cell
pub fn cell_to_text(cell: &CellValue) -> String {
    match cell {
        CellValue::Null => String::new(),
        CellValue::Bool(v) => v.to_string(),
        CellValue::Int(v) => v.to_string(),
        CellValue::Float(v) => v.to_string(),
        CellValue::Decimal(v) => v.to_string(),
        CellValue::Text(v) => v.clone(),
        CellValue::Timestamp(v) => v.to_rfc3339_opts(SecondsFormat::Micros, true),
        CellValue::Date(v) => v.format("%Y-%m-%d").to_string(),
        CellValue::Json(v) => v.to_string(),
        CellValue::Uuid(v) => v.hyphenated().to_string(),
    }
}

/// Encode a batch as CSV bytes
///
/// # Errors
///
/// Returns [`HighwaterError::Persist`] if the writer fails.
pub fn encode_csv(batch: &ExtractionBatch) -> Result<Vec<u8>> {
    let persist = |e: csv::Error| HighwaterError::Persist(format!("CSV encoding failed: {e}"));

    let mut writer = Writer::from_writer(Vec::new());
    writer
        .write_record(batch.columns().iter().map(|c| c.name.as_str()))
        .map_err(persist)?;

    for row in batch.rows() {
        writer
            .write_record(row.iter().map(cell_to_text))
            .map_err(persist)?;
    }

    writer
        .into_inner()
        .map_err(|e| HighwaterError::Persist(format!("CSV encoding failed: {e}")))
}
