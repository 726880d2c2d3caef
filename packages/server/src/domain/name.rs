//! Display name value object.

use std::fmt;

use super::error::NameError;

/// A validated participant display name.
///
/// Unique within the registry; surrounding whitespace is never part of it.
/// It never contains control characters, so every line it is formatted into
/// stays a single line.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DisplayName(String);

impl DisplayName {
    /// Trim `raw` and validate it against `max_len` (bytes).
    pub fn parse(raw: &str, max_len: usize) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Empty);
        }
        if trimmed.len() > max_len {
            return Err(NameError::TooLong { max: max_len });
        }
        if trimmed.chars().any(char::is_control) {
            return Err(NameError::ControlCharacter);
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DisplayName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DisplayName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
