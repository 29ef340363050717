//! Data movers
//!
//! [`DataMover`] is the seam between the run state machine and the outside
//! world; [`ExtractionSession`] is the PostgreSQL-to-storage implementation.

pub mod session;
pub mod traits;

pub use session::ExtractionSession;
pub use traits::DataMover;
