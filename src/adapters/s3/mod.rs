//! Shared S3 plumbing

pub mod client;

pub use client::{build_s3_client, join_key};
