//! Domain types for Highwater.
//!
//! # Overview
//!
//! The domain layer provides:
//! - **Validated identifiers** ([`SourceId`], [`ColumnName`]) that are safe to
//!   place in SQL text once quoted
//! - **Error types** ([`HighwaterError`])
//! - **Result type alias** ([`Result`])
//!
//! # Error Handling
//!
//! All fallible library operations return [`Result<T, HighwaterError>`]:
//!
//! ```rust
//! use highwater::domain::{HighwaterError, Result};
//!
//! fn example() -> Result<()> {
//!     let _config = highwater::config::load_config("highwater.toml")?;
//!     Ok(())
//! }
//! ```

pub mod errors;
pub mod ids;
pub mod result;

pub use errors::HighwaterError;
pub use ids::{ColumnName, SourceId};
pub use result::Result;
