//! Artifact encoders

pub mod csv;
pub mod parquet;

use crate::config::OutputFormat;
use crate::core::extract::ExtractionBatch;
use crate::domain::Result;

/// Encode `batch` in the requested format
pub fn encode_batch(batch: &ExtractionBatch, format: OutputFormat) -> Result<Vec<u8>> {
    match format {
        OutputFormat::Csv => csv::encode_csv(batch),
        OutputFormat::Parquet => parquet::encode_parquet(batch),
    }
}
