//! Entities - caller-owned records persisted through a repository.
//!
//! The repository never looks inside an entity. It only needs to know which
//! collection the entity belongs to and which field(s) identify it.
//!
//! ## Example
//!
//! ```ignore
//! use tracked_repo::Entity;
//!
//! #[derive(Clone, Serialize, Deserialize, Entity)]
//! #[entity(collection = "notes")]
//! struct Note {
//!     #[entity(key)]
//!     pub id: u64,
//!     pub body: String,
//! }
//! ```

mod key;
mod state;

use serde::{de::DeserializeOwned, Serialize};

pub use key::{EntityKey, KeyComponent};
pub use state::EntityState;

/// Trait for types that can be tracked by a data context.
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// The collection name for this entity type (e.g., "notes", "order_lines").
    /// Maps to a table in SQL, a collection in MongoDB, a key prefix in KV stores, etc.
    const COLLECTION: &'static str;

    /// Returns the identity of this entity instance.
    fn key(&self) -> EntityKey;
}
