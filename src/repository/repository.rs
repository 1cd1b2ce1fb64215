use std::borrow::Borrow;

use super::error::RepositoryError;
use crate::entity::{Entity, EntityKey};

/// Persistence operations over one entity type.
///
/// Every write performs exactly one commit, except `delete_all`, which
/// commits once per item. `None` arguments to single-item writes are no-ops.
pub trait EntityRepository<E: Entity> {
    /// Point lookup by identity. Never commits.
    fn find<K: Into<EntityKey>>(&self, key: K) -> Result<Option<E>, RepositoryError>;

    /// Stage `entity` as added and commit.
    fn insert<'e, T>(&self, entity: T) -> Result<(), RepositoryError>
    where
        T: Into<Option<&'e E>>;

    /// Overwrite the stored row of `entity` and commit.
    fn update<'e, T>(&self, entity: T) -> Result<(), RepositoryError>
    where
        T: Into<Option<&'e E>>;

    /// Remove the stored row of `entity` and commit.
    fn delete<'e, T>(&self, entity: T) -> Result<(), RepositoryError>
    where
        T: Into<Option<&'e E>>;

    /// Stage every entity as added, then commit once (also when empty).
    fn insert_all<I>(&self, entities: I) -> Result<(), RepositoryError>
    where
        I: IntoIterator,
        I::Item: Borrow<E>;

    /// Stage every entity as modified, then commit once (also when empty).
    fn update_all<I>(&self, entities: I) -> Result<(), RepositoryError>
    where
        I: IntoIterator,
        I::Item: Borrow<E>;

    /// Remove and commit each entity in turn. Stops at the first failure,
    /// leaving earlier items deleted and later ones untouched.
    fn delete_all<I>(&self, entities: I) -> Result<(), RepositoryError>
    where
        I: IntoIterator,
        I::Item: Borrow<E>;
}
