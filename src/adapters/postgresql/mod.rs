//! PostgreSQL source adapter

pub mod client;
pub mod rows;
pub mod source;

pub use client::PostgreSQLClient;
pub use source::PostgreSQLSource;
