//! Query - Composable, lazily evaluated reads over an entity set.

use std::cmp::Ordering;

use super::{ContextError, DataContext, EntitySet};
use crate::entity::Entity;

type Predicate<'a, E> = Box<dyn Fn(&E) -> bool + 'a>;
type Comparator<'a, E> = Box<dyn Fn(&E, &E) -> Ordering + 'a>;

/// A query over the committed entities of one collection.
///
/// Building a query reads nothing. The store is only touched when a terminal
/// (`to_vec`, `first`, `count`, `exists`, `select`) runs, and every terminal
/// reads afresh.
///
/// ## Example
///
/// ```ignore
/// let open = repo
///     .queryable()?
///     .filter(|t: &Ticket| !t.closed)
///     .order_by_key(|t| t.priority)
///     .take(10)
///     .to_vec()?;
/// ```
pub struct Query<'a, C, E> {
    set: EntitySet<'a, C, E>,
    filters: Vec<Predicate<'a, E>>,
    order: Option<Comparator<'a, E>>,
    skip: usize,
    take: Option<usize>,
}

impl<'a, C: DataContext, E: Entity> Query<'a, C, E> {
    pub(crate) fn new(set: EntitySet<'a, C, E>) -> Self {
        Self {
            set,
            filters: Vec::new(),
            order: None,
            skip: 0,
            take: None,
        }
    }

    /// Keep only entities matching the predicate. Filters are combined with AND.
    pub fn filter<F>(mut self, predicate: F) -> Self
    where
        F: Fn(&E) -> bool + 'a,
    {
        self.filters.push(Box::new(predicate));
        self
    }

    /// Sort with a comparator. Replaces any previous ordering.
    pub fn order_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&E, &E) -> Ordering + 'a,
    {
        self.order = Some(Box::new(compare));
        self
    }

    /// Sort by a derived key. Replaces any previous ordering.
    pub fn order_by_key<K, F>(self, key: F) -> Self
    where
        K: Ord,
        F: Fn(&E) -> K + 'a,
    {
        self.order_by(move |a, b| key(a).cmp(&key(b)))
    }

    /// Skip the first `n` results (after filtering and ordering).
    pub fn skip(mut self, n: usize) -> Self {
        self.skip = n;
        self
    }

    /// Return at most `n` results.
    pub fn take(mut self, n: usize) -> Self {
        self.take = Some(n);
        self
    }

    /// Materialize the query.
    pub fn to_vec(&self) -> Result<Vec<E>, ContextError> {
        let mut rows: Vec<E> = self
            .set
            .load()?
            .into_iter()
            .filter(|row| self.filters.iter().all(|keep| keep(row)))
            .collect();

        if let Some(compare) = &self.order {
            rows.sort_by(|a, b| compare(a, b));
        }

        let take = self.take.unwrap_or(usize::MAX);
        Ok(rows.into_iter().skip(self.skip).take(take).collect())
    }

    /// First result, if any.
    pub fn first(&self) -> Result<Option<E>, ContextError> {
        Ok(self.to_vec()?.into_iter().next())
    }

    /// Number of results.
    pub fn count(&self) -> Result<usize, ContextError> {
        Ok(self.to_vec()?.len())
    }

    /// Whether there is at least one result.
    pub fn exists(&self) -> Result<bool, ContextError> {
        Ok(self.first()?.is_some())
    }

    /// Materialize and project each result.
    pub fn select<T, F>(&self, projection: F) -> Result<Vec<T>, ContextError>
    where
        F: Fn(E) -> T,
    {
        Ok(self.to_vec()?.into_iter().map(projection).collect())
    }
}
