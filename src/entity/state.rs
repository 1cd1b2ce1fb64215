use std::fmt;

use serde::{Deserialize, Serialize};

/// Lifecycle state of an entity inside a unit of work.
///
/// The state of every tracked entity decides what `save_changes` writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityState {
    /// Tracked and identical to what the store holds.
    Unchanged,
    /// Staged for insertion.
    Added,
    /// Staged for a whole-row overwrite.
    Modified,
    /// Staged for deletion.
    Removed,
    /// Not tracked by the context.
    Detached,
}

impl EntityState {
    /// Whether a commit has anything to write for an entity in this state.
    pub fn is_pending(&self) -> bool {
        matches!(
            self,
            EntityState::Added | EntityState::Modified | EntityState::Removed
        )
    }
}

impl fmt::Display for EntityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EntityState::Unchanged => "unchanged",
            EntityState::Added => "added",
            EntityState::Modified => "modified",
            EntityState::Removed => "removed",
            EntityState::Detached => "detached",
        };
        f.write_str(name)
    }
}
