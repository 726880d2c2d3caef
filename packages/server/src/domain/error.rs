//! Domain errors.

use thiserror::Error;

/// Display name validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NameError {
    /// Name is empty after trimming surrounding whitespace
    #[error("name is empty")]
    Empty,

    /// Name exceeds the configured maximum length (in bytes)
    #[error("name is longer than {max} bytes")]
    TooLong { max: usize },

    /// Name contains a line break or another control character
    #[error("name contains control characters")]
    ControlCharacter,
}
