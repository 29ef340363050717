//! Checkpoint record encoding
//!
//! A checkpoint is a two-line CSV document:
//!
//! ```text
//! max_id,table_name
//! 1500,public.sales
//! ```
//!
//! Both the file and the S3 backend store exactly these bytes.

use crate::core::state::watermark::{Watermark, WatermarkValue};
use crate::domain::ids::SourceId;
use crate::domain::{HighwaterError, Result};

const HEADER: [&str; 2] = ["max_id", "table_name"];

/// Encode a watermark as a checkpoint document
///
/// # Errors
///
/// Refuses to encode the minimum value, which has no durable form.
pub fn encode(watermark: &Watermark) -> Result<Vec<u8>> {
    let value = watermark.value.encode().ok_or_else(|| {
        HighwaterError::CheckpointWrite(format!(
            "refusing to persist the minimum watermark for {}",
            watermark.source
        ))
    })?;

    let write_failed =
        |e: csv::Error| HighwaterError::CheckpointWrite(format!("failed to encode checkpoint: {e}"));

    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(HEADER).map_err(write_failed)?;
    writer
        .write_record([value.as_str(), watermark.source.as_str()])
        .map_err(write_failed)?;
    writer
        .into_inner()
        .map_err(|e| HighwaterError::CheckpointWrite(format!("failed to encode checkpoint: {e}")))
}

/// Decode a checkpoint document for `expected`
///
/// Every failure is reported as corrupt, tagged with `location`.
pub fn decode(bytes: &[u8], expected: &SourceId, location: &str) -> Result<Watermark> {
    let corrupt = |reason: String| HighwaterError::corrupt(location, reason);

    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(corrupt("checkpoint is empty".to_string()));
    }

    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .from_reader(bytes);

    let headers = reader
        .headers()
        .map_err(|e| corrupt(format!("unreadable header: {e}")))?
        .clone();
    if headers.len() != HEADER.len() || headers.iter().zip(HEADER).any(|(a, b)| a != b) {
        return Err(corrupt(format!(
            "expected header 'max_id,table_name', found '{}'",
            headers.iter().collect::<Vec<_>>().join(",")
        )));
    }

    let mut records = reader.records();
    let record = match records.next() {
        Some(record) => record.map_err(|e| corrupt(format!("unreadable record: {e}")))?,
        None => return Err(corrupt("checkpoint has a header but no record".to_string())),
    };
    if records.next().is_some() {
        return Err(corrupt("checkpoint holds more than one record".to_string()));
    }

    let stored_source = record.get(1).unwrap_or_default();
    if stored_source != expected.as_str() {
        return Err(corrupt(format!(
            "checkpoint belongs to '{stored_source}', not '{expected}'"
        )));
    }

    let value = WatermarkValue::parse(record.get(0).unwrap_or_default()).map_err(corrupt)?;

    Ok(Watermark::new(expected.clone(), value))
}
