/// A failed argument precondition.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("{name} must not be null or empty")]
    NullOrEmpty { name: String },
}

/// Argument validation utilities.
///
/// Each check returns `Err(ArgError)` naming the offending parameter so callers
/// can propagate it with `?` and fail the operation.
pub struct ArgUtil;

impl ArgUtil {
    /// Checks that the string is not empty.
    pub fn not_null_or_empty(value: &str, name: &str) -> Result<(), ArgError> {
        if value.is_empty() {
            return Err(ArgError::NullOrEmpty {
                name: name.to_string(),
            });
        }
        Ok(())
    }
}
