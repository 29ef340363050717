//! External system integrations for Highwater.
//!
//! - [`postgresql`] - source database (pooled, TLS aware)
//! - [`checkpoint`] - watermark stores (local file, S3)
//! - [`storage`] - artifact sinks (S3, local directory)
//! - [`encode`] - CSV and Parquet encoders
//! - [`mover`] - the [`mover::DataMover`] seam used by the runner
//! - [`s3`] - shared S3 client construction
//!
//! # Design Pattern
//!
//! Adapters isolate external dependencies behind traits
//! ([`checkpoint::WatermarkStore`], [`storage::ArtifactSink`],
//! [`mover::DataMover`]) so the run logic can be tested with in-memory
//! implementations.

pub mod checkpoint;
pub mod encode;
pub mod mover;
pub mod postgresql;
pub mod s3;
pub mod storage;
