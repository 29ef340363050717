//! Incremental extraction: batches, artifact naming and the run state machine

pub mod artifact;
pub mod batch;
pub mod outcome;
pub mod runner;
pub mod summary;

pub use artifact::ArtifactPath;
pub use batch::{CellValue, Column, ColumnType, ExtractionBatch};
pub use outcome::{error_exit_code, RunOutcome, RunStage, RunState};
pub use runner::{Clock, ExtractionRunner, RunSettings};
pub use summary::RunSummary;
