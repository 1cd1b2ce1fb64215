//! EntitySet - Typed accessor for one collection of a data context.

use std::marker::PhantomData;

use super::{ContextError, DataContext, Query};
use crate::entity::{Entity, EntityKey, EntityState};

/// Typed view of the entities of type `E` tracked by a context.
pub struct EntitySet<'a, C, E> {
    context: &'a C,
    _marker: PhantomData<fn() -> E>,
}

impl<C, E> Clone for EntitySet<'_, C, E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<C, E> Copy for EntitySet<'_, C, E> {}

impl<'a, C: DataContext, E: Entity> EntitySet<'a, C, E> {
    pub fn new(context: &'a C) -> Self {
        Self {
            context,
            _marker: PhantomData,
        }
    }

    /// Start tracking an entity as `Unchanged`.
    pub fn attach(&self, entity: &E) -> Result<(), ContextError> {
        self.context.attach_entity(entity)
    }

    /// Track an entity as `Added`.
    pub fn add(&self, entity: &E) -> Result<(), ContextError> {
        self.context.add_entity(entity)
    }

    /// Request removal of an entity.
    pub fn remove(&self, entity: &E) -> Result<(), ContextError> {
        self.context.remove_entity(entity)
    }

    /// Force the state of an entity.
    pub fn set_state(&self, entity: &E, state: EntityState) -> Result<(), ContextError> {
        self.context.set_entity_state(entity, state)
    }

    /// Current state of the entity with this key.
    pub fn state(&self, key: impl Into<EntityKey>) -> Result<EntityState, ContextError> {
        self.context.entity_state::<E>(&key.into())
    }

    /// Point lookup by identity.
    pub fn find(&self, key: impl Into<EntityKey>) -> Result<Option<E>, ContextError> {
        self.context.find_entity(&key.into())
    }

    /// Every committed entity of the collection.
    pub fn load(&self) -> Result<Vec<E>, ContextError> {
        self.context.load_entities()
    }

    /// A lazily evaluated query rooted at this set.
    pub fn query(&self) -> Query<'a, C, E> {
        Query::new(*self)
    }
}

/// Extension trait for typed entity-set access on any DataContext.
pub trait EntitySetsExt: DataContext + Sized {
    /// Get the entity set for `E`.
    fn set<E: Entity>(&self) -> EntitySet<'_, Self, E> {
        EntitySet::new(self)
    }
}

impl<C: DataContext> EntitySetsExt for C {}
