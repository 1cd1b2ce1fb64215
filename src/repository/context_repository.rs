use std::any::{self, Any};
use std::borrow::Borrow;
use std::fmt;
use std::marker::PhantomData;
use std::sync::Arc;

use super::error::RepositoryError;
use super::repository::EntityRepository;
use crate::context::{CommitOutcome, ContextError, DataContext, EntitySet, EntitySetsExt, Query};
use crate::entity::{Entity, EntityKey, EntityState};
use crate::logger::{Logger, NoopLogger};

/// A repository for entities of type `E`, bound to a data context of type `C`.
///
/// The context can be supplied at construction or later (`set_context`,
/// `bind_any`). Binding clones of one context to several repositories makes
/// them share a unit of work.
///
/// Commit failures are logged and then returned: stale writes as
/// `RepositoryError::ConcurrencyConflict`, anything else as
/// `RepositoryError::Store` with the original error untouched. Nothing is
/// retried.
pub struct Repository<E, C> {
    context: Option<C>,
    logger: Arc<dyn Logger>,
    _marker: PhantomData<fn() -> E>,
}

impl<E: Entity, C: DataContext> Default for Repository<E, C> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E, C> fmt::Debug for Repository<E, C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Repository")
            .field("entity", &any::type_name::<E>())
            .field("bound", &self.context.is_some())
            .finish()
    }
}

impl<E: Entity, C: DataContext> Repository<E, C> {
    /// A repository with no context yet, for deferred injection.
    pub fn new() -> Self {
        Self {
            context: None,
            logger: Arc::new(NoopLogger),
            _marker: PhantomData,
        }
    }

    /// A repository bound to `context`, logging nowhere.
    pub fn with_context(context: C) -> Self {
        Self {
            context: Some(context),
            ..Self::new()
        }
    }

    /// A repository bound to `context`, reporting failures to `logger`.
    pub fn with_context_and_logger<L: Logger + 'static>(context: C, logger: L) -> Self {
        Self::with_context(context).logger(logger)
    }

    /// Replace the logger. Uses builder pattern.
    pub fn logger<L: Logger + 'static>(mut self, logger: L) -> Self {
        self.logger = Arc::new(logger);
        self
    }

    /// The bound context, if any.
    pub fn context(&self) -> Option<&C> {
        self.context.as_ref()
    }

    pub fn is_bound(&self) -> bool {
        self.context.is_some()
    }

    /// Bind `context` for every subsequent operation.
    pub fn set_context(&mut self, context: C) {
        self.context = Some(context);
    }

    /// Unbind and return the current context.
    pub fn take_context(&mut self) -> Option<C> {
        self.context.take()
    }

    /// Bind a context handed over as `dyn Any`, e.g. by an injection
    /// container. Fails with `InvalidArgument` if the handle is not a `C`,
    /// leaving the current binding as it was.
    pub fn bind_any(&mut self, handle: Box<dyn Any + Send>) -> Result<(), RepositoryError>
    where
        C: 'static,
    {
        match handle.downcast::<C>() {
            Ok(context) => {
                self.context = Some(*context);
                Ok(())
            }
            Err(_) => Err(RepositoryError::InvalidArgument(format!(
                "context must be a DataContext-compatible object ({})",
                any::type_name::<C>()
            ))),
        }
    }

    /// A lazily evaluated query over the committed entities. Never commits.
    pub fn queryable(&self) -> Result<Query<'_, C, E>, RepositoryError> {
        Ok(self.bound()?.set::<E>().query())
    }

    fn bound(&self) -> Result<&C, RepositoryError> {
        self.context.as_ref().ok_or(RepositoryError::NotConfigured {
            collection: E::COLLECTION,
        })
    }

    /// Stage with `stage`, then commit once. A staging fault still commits
    /// whatever was staged before it; a commit failure wins over the
    /// staging fault. Either way one commit attempt logs at most one error.
    fn stage_and_commit<F>(&self, operation: &'static str, stage: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(EntitySet<'_, C, E>) -> Result<usize, ContextError>,
    {
        let context = self.bound()?;

        let staged = stage(context.set::<E>());
        match &staged {
            Ok(count) => tracing::debug!(
                collection = E::COLLECTION,
                operation,
                staged = *count,
                "entities staged"
            ),
            Err(err) => tracing::warn!(
                collection = E::COLLECTION,
                operation,
                error = %err,
                "staging failed, committing what was staged"
            ),
        }

        self.save_changes(context, operation)?;
        staged.map(|_| ()).map_err(|err| {
            self.logger.error(&err.to_string());
            RepositoryError::Store(err)
        })
    }

    fn save_changes(&self, context: &C, operation: &'static str) -> Result<(), RepositoryError> {
        match CommitOutcome::from(context.save_changes()) {
            CommitOutcome::Committed { affected } => {
                tracing::debug!(
                    collection = E::COLLECTION,
                    operation,
                    affected,
                    "unit of work committed"
                );
                Ok(())
            }
            CommitOutcome::Conflict(err) => {
                self.logger.error(&err.to_string());
                Err(RepositoryError::ConcurrencyConflict(err))
            }
            CommitOutcome::Failed(err) => {
                self.logger.error(&err.to_string());
                Err(RepositoryError::Store(err))
            }
        }
    }

    fn delete_one(&self, entity: &E) -> Result<(), RepositoryError> {
        self.stage_and_commit("delete", |set| {
            set.attach(entity)?;
            set.set_state(entity, EntityState::Removed)?;
            set.remove(entity)?;
            Ok(1)
        })
    }
}

impl<E: Entity, C: DataContext> EntityRepository<E> for Repository<E, C> {
    fn find<K: Into<EntityKey>>(&self, key: K) -> Result<Option<E>, RepositoryError> {
        self.bound()?
            .set::<E>()
            .find(key)
            .map_err(RepositoryError::Store)
    }

    fn insert<'e, T>(&self, entity: T) -> Result<(), RepositoryError>
    where
        T: Into<Option<&'e E>>,
    {
        let Some(entity) = entity.into() else {
            return Ok(());
        };
        self.stage_and_commit("insert", |set| {
            set.add(entity)?;
            Ok(1)
        })
    }

    fn update<'e, T>(&self, entity: T) -> Result<(), RepositoryError>
    where
        T: Into<Option<&'e E>>,
    {
        let Some(entity) = entity.into() else {
            return Ok(());
        };
        self.stage_and_commit("update", |set| {
            set.attach(entity)?;
            set.set_state(entity, EntityState::Modified)?;
            Ok(1)
        })
    }

    fn delete<'e, T>(&self, entity: T) -> Result<(), RepositoryError>
    where
        T: Into<Option<&'e E>>,
    {
        match entity.into() {
            Some(entity) => self.delete_one(entity),
            None => Ok(()),
        }
    }

    fn insert_all<I>(&self, entities: I) -> Result<(), RepositoryError>
    where
        I: IntoIterator,
        I::Item: Borrow<E>,
    {
        self.stage_and_commit("insert_all", |set| {
            let mut staged = 0;
            for entity in entities {
                set.add(entity.borrow())?;
                staged += 1;
            }
            Ok(staged)
        })
    }

    fn update_all<I>(&self, entities: I) -> Result<(), RepositoryError>
    where
        I: IntoIterator,
        I::Item: Borrow<E>,
    {
        self.stage_and_commit("update_all", |set| {
            let mut staged = 0;
            for entity in entities {
                let entity = entity.borrow();
                set.attach(entity)?;
                set.set_state(entity, EntityState::Modified)?;
                staged += 1;
            }
            Ok(staged)
        })
    }

    fn delete_all<I>(&self, entities: I) -> Result<(), RepositoryError>
    where
        I: IntoIterator,
        I::Item: Borrow<E>,
    {
        self.bound()?;
        for entity in entities {
            self.delete_one(entity.borrow())?;
        }
        Ok(())
    }
}
