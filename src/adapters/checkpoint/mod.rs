//! Watermark checkpoint stores
//!
//! - [`file`] - local directory, atomic rename on write
//! - [`s3`] - S3 object, single PutObject on write
//! - [`record`] - the shared CSV record format

pub mod factory;
pub mod file;
pub mod record;
pub mod s3;
pub mod traits;

pub use factory::{create_watermark_store, CheckpointLocation};
pub use file::FileWatermarkStore;
pub use s3::S3WatermarkStore;
pub use traits::WatermarkStore;
