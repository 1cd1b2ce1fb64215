//! Repositories - typed CRUD over a swappable data context.
//!
//! ## Example
//!
//! ```ignore
//! use tracked_repo::{EntityRepository, InMemoryStore, Repository, TracingLogger};
//!
//! let store = InMemoryStore::new();
//! let notes: Repository<Note, _> =
//!     Repository::with_context_and_logger(store.context(), TracingLogger);
//!
//! notes.insert(&note)?;
//! let loaded = notes.find(note.id)?;
//! ```

mod context_repository;
mod error;
mod repository;

pub use context_repository::Repository;
pub use error::RepositoryError;
pub use repository::EntityRepository;
