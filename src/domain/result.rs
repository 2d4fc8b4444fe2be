//! Result type alias for the screener
//!
//! This module provides a convenient Result type alias that uses `ScreenerError`
//! as the error type.

use super::errors::ScreenerError;

/// Result type alias for screener operations
///
/// # Examples
///
/// ```
/// use trial_screener::domain::result::Result;
/// use trial_screener::domain::errors::ScreenerError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(ScreenerError::InvalidInput("record has no patient id".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, ScreenerError>;
