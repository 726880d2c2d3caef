//! UseCase errors.

use thiserror::Error;

/// Join errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum JoinError {
    /// Another participant already holds this name
    #[error("Another \"{0}\" is already connected")]
    DuplicateName(String),
}
