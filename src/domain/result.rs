//! Result type alias for PiiCatcher
//!
//! This module provides a convenient Result type alias that uses
//! `PiiCatcherError` as the error type.

use super::errors::PiiCatcherError;

/// Result type alias for PiiCatcher operations
///
/// # Examples
///
/// ```
/// use piicatcher::domain::result::Result;
/// use piicatcher::domain::errors::PiiCatcherError;
///
/// fn example_function() -> Result<String> {
///     Ok("success".to_string())
/// }
///
/// fn failing_function() -> Result<()> {
///     Err(PiiCatcherError::Validation("Invalid input".to_string()))
/// }
/// ```
pub type Result<T> = std::result::Result<T, PiiCatcherError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_with_question_mark() -> Result<()> {
        fn inner() -> Result<i32> {
            Ok(42)
        }

        let value = inner()?;
        assert_eq!(value, 42);
        Ok(())
    }
}
