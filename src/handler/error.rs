//! Error types for message handlers.

use std::error::Error;
use std::fmt;

use crate::repository::RepositoryError;

/// Error type for handler operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HandlerError {
    /// Business logic rejected the message (validation, invariant violation).
    Rejected(String),
    /// Repository error.
    Repository(RepositoryError),
}

impl fmt::Display for HandlerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandlerError::Rejected(msg) => write!(f, "rejected: {}", msg),
            HandlerError::Repository(e) => write!(f, "repository error: {}", e),
        }
    }
}

impl Error for HandlerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            HandlerError::Repository(e) => Some(e),
            HandlerError::Rejected(_) => None,
        }
    }
}

impl From<RepositoryError> for HandlerError {
    fn from(err: RepositoryError) -> Self {
        HandlerError::Repository(err)
    }
}
