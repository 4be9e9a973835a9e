//! Result type alias for exportwatch

use super::errors::AppError;

/// Result type alias for exportwatch operations
///
/// # Examples
///
/// ```
/// use exportwatch::domain::result::Result;
/// use exportwatch::domain::errors::AppError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(AppError::Configuration("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, AppError>;
