//! Delta query construction

pub mod builder;

pub use builder::{build_delta_query, DeltaQuery, QueryParam};
