use std::error::Error;
use std::fmt;

use crate::context::ContextError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RepositoryError {
    /// An operation needing a data context ran before one was bound.
    NotConfigured { collection: &'static str },
    /// A loosely-typed context handle was not a context of the expected type.
    InvalidArgument(String),
    /// The store rejected a stale write. Outer transaction coordinators must
    /// see this to roll back.
    ConcurrencyConflict(ContextError),
    /// Any other store failure, carried unchanged.
    Store(ContextError),
}

impl RepositoryError {
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, RepositoryError::ConcurrencyConflict(_))
    }

    /// The underlying store error, if this failure came from the store.
    pub fn store_error(&self) -> Option<&ContextError> {
        match self {
            RepositoryError::ConcurrencyConflict(err) | RepositoryError::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RepositoryError::NotConfigured { collection } => {
                write!(f, "no data context bound to the {} repository", collection)
            }
            RepositoryError::InvalidArgument(message) => {
                write!(f, "invalid argument: {}", message)
            }
            RepositoryError::ConcurrencyConflict(_) => write!(
                f,
                "optimistic concurrency conflict: the write would overwrite changes made \
                 after the data was read, so it was rejected"
            ),
            RepositoryError::Store(err) => write!(f, "{}", err),
        }
    }
}

impl Error for RepositoryError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            RepositoryError::ConcurrencyConflict(err) | RepositoryError::Store(err) => Some(err),
            _ => None,
        }
    }
}
