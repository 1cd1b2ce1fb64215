mod context;
mod entity;
#[cfg(feature = "handlers")]
pub mod handler;
mod logger;
mod repository;

pub use context::{
    CommitOutcome, ContextError, DataContext, EntitySet, EntitySetsExt, InMemoryContext,
    InMemoryStore, Query,
};
pub use entity::{Entity, EntityKey, EntityState, KeyComponent};
pub use logger::{Logger, MemoryLogger, NoopLogger, TracingLogger};
pub use repository::{EntityRepository, Repository, RepositoryError};

// Re-export the derive macro alongside the trait it implements
pub use tracked_repo_macros::Entity;
