//! Data contexts - units of work that track entity states and flush them.
//!
//! A `DataContext` is the only thing a repository talks to. It stages entities
//! (`attach`, `add`, `remove`, `set_state`), answers point lookups, and writes
//! every staged change in one `save_changes` call.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────┐
//! │     Repository<E, C>         │  one commit per operation
//! └──────────────────────────────┘
//!                │ set::<E>()
//!                ▼
//! ┌──────────────────────────────┐
//! │     EntitySet<'_, C, E>      │  typed accessor, short names
//! └──────────────────────────────┘
//!                │
//!                ▼
//! ┌──────────────────────────────┐
//! │     DataContext (trait)      │  change tracker + save_changes
//! └──────────────────────────────┘
//!          │                │
//!          ▼                ▼
//! ┌─────────────────┐  ┌──────────────────┐
//! │ InMemoryContext │  │ SQL / KV context │
//! │   (included)    │  │    (external)    │
//! └─────────────────┘  └──────────────────┘
//! ```

mod in_memory;
mod query;
mod set;

use std::fmt;

use crate::entity::{Entity, EntityKey, EntityState};

pub use in_memory::{InMemoryContext, InMemoryStore};
pub use query::Query;
pub use set::{EntitySet, EntitySetsExt};

/// A unit of work over some persistence engine.
///
/// Methods that stage changes never write to the store; only `save_changes`
/// does. Implementations are expected to be cheap handles: cloning a context
/// shares its change tracker, so several repositories can stage into the same
/// unit of work.
pub trait DataContext: Send + Sync {
    /// Start tracking an entity as `Unchanged`. Refreshes the tracked value
    /// when the entity is already tracked.
    fn attach_entity<E: Entity>(&self, entity: &E) -> Result<(), ContextError>;

    /// Track an entity as `Added`. Adding a key the unit of work already
    /// tracks (other than as `Removed`) makes the next `save_changes` fail
    /// with `ContextError::DuplicateKey`.
    fn add_entity<E: Entity>(&self, entity: &E) -> Result<(), ContextError>;

    /// Request removal of an entity from the tracked set.
    fn remove_entity<E: Entity>(&self, entity: &E) -> Result<(), ContextError>;

    /// Force the state of an entity, attaching it first if untracked.
    fn set_entity_state<E: Entity>(
        &self,
        entity: &E,
        state: EntityState,
    ) -> Result<(), ContextError>;

    /// Current state of the entity with this key. `Detached` when untracked.
    fn entity_state<E: Entity>(&self, key: &EntityKey) -> Result<EntityState, ContextError>;

    /// Point lookup by identity.
    fn find_entity<E: Entity>(&self, key: &EntityKey) -> Result<Option<E>, ContextError>;

    /// Every committed entity of the collection, ordered by key.
    fn load_entities<E: Entity>(&self) -> Result<Vec<E>, ContextError>;

    /// Flush all staged changes. Returns the number of rows written.
    fn save_changes(&self) -> Result<usize, ContextError>;
}

/// Error type for data context operations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// Optimistic concurrency conflict: the row changed (or vanished) since
    /// it was read. Versions of 0 mean the row was absent.
    ConcurrencyConflict {
        collection: String,
        key: String,
        expected: u64,
        actual: u64,
    },
    /// An added entity collides with an existing row.
    DuplicateKey { collection: String, key: String },
    /// Serialization/deserialization error.
    Serde(String),
    /// Storage-level error.
    Storage(String),
    /// The engine could not be reached.
    Unavailable(String),
}

impl ContextError {
    /// Whether this failure is a stale-write conflict rather than any other
    /// kind of failure.
    pub fn is_concurrency_conflict(&self) -> bool {
        matches!(self, ContextError::ConcurrencyConflict { .. })
    }
}

impl fmt::Display for ContextError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContextError::ConcurrencyConflict {
                collection,
                key,
                expected,
                actual,
            } => write!(
                f,
                "concurrency conflict on {}:{} (expected version {}, actual {})",
                collection, key, expected, actual
            ),
            ContextError::DuplicateKey { collection, key } => {
                write!(f, "duplicate key {}:{}", collection, key)
            }
            ContextError::Serde(msg) => write!(f, "entity serialization error: {}", msg),
            ContextError::Storage(msg) => write!(f, "storage error: {}", msg),
            ContextError::Unavailable(msg) => write!(f, "store unavailable: {}", msg),
        }
    }
}

impl std::error::Error for ContextError {}

impl From<serde_json::Error> for ContextError {
    fn from(err: serde_json::Error) -> Self {
        ContextError::Serde(err.to_string())
    }
}

/// Classified result of a `save_changes` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// Every staged change was written.
    Committed { affected: usize },
    /// Another writer changed a tracked row between read and write.
    Conflict(ContextError),
    /// Any other failure (connectivity, constraint, serialization, ...).
    Failed(ContextError),
}

impl CommitOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, CommitOutcome::Committed { .. })
    }
}

impl From<Result<usize, ContextError>> for CommitOutcome {
    fn from(result: Result<usize, ContextError>) -> Self {
        match result {
            Ok(affected) => CommitOutcome::Committed { affected },
            Err(err) if err.is_concurrency_conflict() => CommitOutcome::Conflict(err),
            Err(err) => CommitOutcome::Failed(err),
        }
    }
}
