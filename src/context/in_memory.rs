//! InMemoryStore / InMemoryContext - HashMap-backed engine for testing and development.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::{ContextError, DataContext};
use crate::entity::{Entity, EntityKey, EntityState};

type RowKey = (String, EntityKey);

fn row_key<E: Entity>(key: EntityKey) -> RowKey {
    (E::COLLECTION.to_string(), key)
}

/// Internal stored representation of an entity.
struct StoredRow {
    bytes: Vec<u8>,
    version: u64,
}

/// Committed rows shared by every context opened on it.
///
/// Storage key is `(collection, key)`. Clone-friendly via Arc.
#[derive(Clone)]
pub struct InMemoryStore {
    rows: Arc<RwLock<HashMap<RowKey, StoredRow>>>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    /// Create a new empty store.
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Open a new unit of work over this store.
    pub fn context(&self) -> InMemoryContext {
        InMemoryContext::new(self.clone())
    }

    /// Write an entity directly, outside any unit of work. Returns the new
    /// row version.
    pub fn seed<E: Entity>(&self, entity: &E) -> Result<u64, ContextError> {
        let key = row_key::<E>(entity.key());
        let bytes = serde_json::to_vec(entity)?;
        let mut rows = self.write()?;

        let version = rows.get(&key).map(|row| row.version + 1).unwrap_or(1);
        rows.insert(key, StoredRow { bytes, version });

        Ok(version)
    }

    /// Read a committed entity without tracking it.
    pub fn get<E: Entity>(&self, key: impl Into<EntityKey>) -> Result<Option<E>, ContextError> {
        let key = row_key::<E>(key.into());
        let rows = self.read()?;

        match rows.get(&key) {
            Some(row) => Ok(Some(serde_json::from_slice(&row.bytes)?)),
            None => Ok(None),
        }
    }

    /// Committed version of a row, if it exists.
    pub fn version<E: Entity>(
        &self,
        key: impl Into<EntityKey>,
    ) -> Result<Option<u64>, ContextError> {
        let key = row_key::<E>(key.into());
        Ok(self.read()?.get(&key).map(|row| row.version))
    }

    /// Number of committed rows in the collection of `E`.
    pub fn count<E: Entity>(&self) -> Result<usize, ContextError> {
        let rows = self.read()?;
        Ok(rows
            .keys()
            .filter(|(collection, _)| collection == E::COLLECTION)
            .count())
    }

    fn load<E: Entity>(&self) -> Result<Vec<E>, ContextError> {
        let rows = self.read()?;

        let mut matching: Vec<(&EntityKey, &StoredRow)> = rows
            .iter()
            .filter(|((collection, _), _)| collection == E::COLLECTION)
            .map(|((_, key), row)| (key, row))
            .collect();
        matching.sort_by(|a, b| a.0.cmp(b.0));

        matching
            .into_iter()
            .map(|(_, row)| serde_json::from_slice(&row.bytes).map_err(ContextError::from))
            .collect()
    }

    fn stored_version(&self, key: &RowKey) -> Result<u64, ContextError> {
        Ok(self.read()?.get(key).map(|row| row.version).unwrap_or(0))
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, HashMap<RowKey, StoredRow>>, ContextError> {
        self.rows
            .read()
            .map_err(|_| ContextError::Storage("lock poisoned".into()))
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, HashMap<RowKey, StoredRow>>, ContextError> {
        self.rows
            .write()
            .map_err(|_| ContextError::Storage("lock poisoned".into()))
    }
}

/// A tracked entity: its staged state, latest value, and the row version
/// observed when tracking began (0 when the row did not exist).
///
/// `duplicate` is set when the key was added while already tracked; the next
/// save rejects the whole unit of work.
struct TrackedEntry {
    state: EntityState,
    bytes: Vec<u8>,
    original_version: u64,
    seq: u64,
    duplicate: bool,
}

#[derive(Default)]
struct ChangeTracker {
    entries: HashMap<RowKey, TrackedEntry>,
    next_seq: u64,
}

impl ChangeTracker {
    fn track(&mut self, key: RowKey, state: EntityState, bytes: Vec<u8>, original_version: u64) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.entries.insert(
            key,
            TrackedEntry {
                state,
                bytes,
                original_version,
                seq,
                duplicate: false,
            },
        );
    }
}

/// One unit of work over an `InMemoryStore`.
///
/// Clones share the change tracker, so repositories bound to clones of the
/// same context stage into, and commit, the same unit of work. Open a fresh
/// context with `InMemoryStore::context()` for an independent one.
#[derive(Clone)]
pub struct InMemoryContext {
    store: InMemoryStore,
    tracker: Arc<Mutex<ChangeTracker>>,
}

impl InMemoryContext {
    pub fn new(store: InMemoryStore) -> Self {
        Self {
            store,
            tracker: Arc::new(Mutex::new(ChangeTracker::default())),
        }
    }

    /// The store this context commits to.
    pub fn store(&self) -> &InMemoryStore {
        &self.store
    }

    /// Number of tracked entities with a change staged.
    pub fn pending_changes(&self) -> Result<usize, ContextError> {
        Ok(self
            .tracker()?
            .entries
            .values()
            .filter(|entry| entry.state.is_pending())
            .count())
    }

    /// Number of tracked entities, whatever their state.
    pub fn tracked(&self) -> Result<usize, ContextError> {
        Ok(self.tracker()?.entries.len())
    }

    /// Stop tracking everything without writing.
    pub fn discard_changes(&self) -> Result<(), ContextError> {
        self.tracker()?.entries.clear();
        Ok(())
    }

    fn tracker(&self) -> Result<MutexGuard<'_, ChangeTracker>, ContextError> {
        self.tracker
            .lock()
            .map_err(|_| ContextError::Storage("change tracker lock poisoned".into()))
    }

    /// Track `entity` (refreshing its value if already tracked) and apply
    /// `transition` to its state.
    fn stage<E: Entity>(
        &self,
        entity: &E,
        transition: impl FnOnce(Option<EntityState>) -> EntityState,
    ) -> Result<(), ContextError> {
        self.stage_entry(entity, false, transition)
    }

    /// Like `stage`. With `adding`, a key already tracked as anything but
    /// `Removed` is flagged as a duplicate instead of silently replaced.
    fn stage_entry<E: Entity>(
        &self,
        entity: &E,
        adding: bool,
        transition: impl FnOnce(Option<EntityState>) -> EntityState,
    ) -> Result<(), ContextError> {
        let key = row_key::<E>(entity.key());
        let bytes = serde_json::to_vec(entity)?;
        let mut tracker = self.tracker()?;

        if let Some(entry) = tracker.entries.get_mut(&key) {
            if adding && entry.state != EntityState::Removed {
                entry.duplicate = true;
                return Ok(());
            }
            entry.state = transition(Some(entry.state));
            entry.bytes = bytes;
        } else {
            let version = self.store.stored_version(&key)?;
            tracker.track(key.clone(), transition(None), bytes, version);
        }

        if tracker.entries.get(&key).map(|entry| entry.state) == Some(EntityState::Detached) {
            tracker.entries.remove(&key);
        }

        Ok(())
    }
}

impl DataContext for InMemoryContext {
    fn attach_entity<E: Entity>(&self, entity: &E) -> Result<(), ContextError> {
        self.stage(entity, |current| current.unwrap_or(EntityState::Unchanged))
    }

    fn add_entity<E: Entity>(&self, entity: &E) -> Result<(), ContextError> {
        self.stage_entry(entity, true, |current| match current {
            Some(EntityState::Removed) => EntityState::Modified,
            _ => EntityState::Added,
        })
    }

    fn remove_entity<E: Entity>(&self, entity: &E) -> Result<(), ContextError> {
        self.stage(entity, |current| match current {
            Some(EntityState::Added) => EntityState::Detached,
            _ => EntityState::Removed,
        })
    }

    fn set_entity_state<E: Entity>(
        &self,
        entity: &E,
        state: EntityState,
    ) -> Result<(), ContextError> {
        self.stage(entity, |_| state)
    }

    fn entity_state<E: Entity>(&self, key: &EntityKey) -> Result<EntityState, ContextError> {
        let key = row_key::<E>(key.clone());
        Ok(self
            .tracker()?
            .entries
            .get(&key)
            .map(|entry| entry.state)
            .unwrap_or(EntityState::Detached))
    }

    fn find_entity<E: Entity>(&self, key: &EntityKey) -> Result<Option<E>, ContextError> {
        let key = row_key::<E>(key.clone());
        let mut tracker = self.tracker()?;

        if let Some(entry) = tracker.entries.get(&key) {
            if entry.state == EntityState::Removed {
                return Ok(None);
            }
            return Ok(Some(serde_json::from_slice(&entry.bytes)?));
        }

        let stored = {
            let rows = self.store.read()?;
            rows.get(&key).map(|row| (row.bytes.clone(), row.version))
        };

        match stored {
            Some((bytes, version)) => {
                let entity = serde_json::from_slice(&bytes)?;
                tracker.track(key, EntityState::Unchanged, bytes, version);
                Ok(Some(entity))
            }
            None => Ok(None),
        }
    }

    fn load_entities<E: Entity>(&self) -> Result<Vec<E>, ContextError> {
        self.store.load()
    }

    fn save_changes(&self) -> Result<usize, ContextError> {
        let mut tracker = self.tracker()?;

        let mut pending: Vec<(u64, RowKey)> = tracker
            .entries
            .iter()
            .filter(|(_, entry)| entry.state.is_pending() || entry.duplicate)
            .map(|(key, entry)| (entry.seq, key.clone()))
            .collect();
        if pending.is_empty() {
            return Ok(0);
        }
        pending.sort();

        let mut rows = self.store.write()?;

        // Validate everything before writing anything.
        for (_, key) in &pending {
            let Some(entry) = tracker.entries.get(key) else {
                continue;
            };
            let actual = rows.get(key).map(|row| row.version).unwrap_or(0);
            let (collection, entity_key) = key;

            let failure = match entry.state {
                _ if entry.duplicate => Some(ContextError::DuplicateKey {
                    collection: collection.clone(),
                    key: entity_key.to_string(),
                }),
                EntityState::Added if actual != 0 => Some(ContextError::DuplicateKey {
                    collection: collection.clone(),
                    key: entity_key.to_string(),
                }),
                EntityState::Modified | EntityState::Removed
                    if actual == 0 || actual != entry.original_version =>
                {
                    Some(ContextError::ConcurrencyConflict {
                        collection: collection.clone(),
                        key: entity_key.to_string(),
                        expected: entry.original_version,
                        actual,
                    })
                }
                _ => None,
            };

            if let Some(err) = failure {
                tracker.entries.clear();
                return Err(err);
            }
        }

        for (_, key) in &pending {
            let Some(entry) = tracker.entries.get_mut(key) else {
                continue;
            };
            match entry.state {
                EntityState::Added | EntityState::Modified => {
                    let version = rows.get(key).map(|row| row.version + 1).unwrap_or(1);
                    rows.insert(
                        key.clone(),
                        StoredRow {
                            bytes: entry.bytes.clone(),
                            version,
                        },
                    );
                    entry.state = EntityState::Unchanged;
                    entry.original_version = version;
                }
                EntityState::Removed => {
                    rows.remove(key);
                }
                EntityState::Unchanged | EntityState::Detached => {}
            }
        }

        tracker
            .entries
            .retain(|_, entry| entry.state != EntityState::Removed);

        Ok(pending.len())
    }
}
