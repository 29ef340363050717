//! Result type alias for Highwater

use super::errors::HighwaterError;

/// Result type alias for Highwater operations
///
/// # Examples
///
/// ```
/// use highwater::domain::result::Result;
/// use highwater::domain::errors::HighwaterError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(HighwaterError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, HighwaterError>;
