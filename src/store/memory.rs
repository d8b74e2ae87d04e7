//! In-memory search repository.
//!
//! Records live in a shared `Arc<Vec<S>>`; store-natural order is insertion
//! order. Queries are lazy: the predicate, ordering and paging are applied
//! when the query is fetched.

use crate::error::SearchError;
use crate::query::ordering::{sort_by_keys, SortDirection};
use crate::query::selector::OrderKey;
use crate::repository::{compose_skip, compose_take, BoxFuture, Queryable, SearchRepository};
use std::fmt;
use std::sync::Arc;

/// Predicate evaluated against each stored record.
pub struct MemoryPredicate<S> {
    test: Arc<dyn Fn(&S) -> bool + Send + Sync>,
}

impl<S> MemoryPredicate<S> {
    pub fn new<F>(test: F) -> Self
    where
        F: Fn(&S) -> bool + Send + Sync + 'static,
    {
        Self { test: Arc::new(test) }
    }

    /// Predicate matching every record.
    pub fn all() -> Self {
        Self::new(|_| true)
    }

    pub fn matches(&self, record: &S) -> bool {
        (*self.test)(record)
    }
}

impl<S> Clone for MemoryPredicate<S> {
    fn clone(&self) -> Self {
        Self {
            test: Arc::clone(&self.test),
        }
    }
}

impl<S> fmt::Debug for MemoryPredicate<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("MemoryPredicate")
    }
}

/// Repository over an in-memory collection.
#[derive(Debug)]
pub struct MemoryRepository<S> {
    records: Arc<Vec<S>>,
}

impl<S> MemoryRepository<S> {
    pub fn new(records: Vec<S>) -> Self {
        Self {
            records: Arc::new(records),
        }
    }

    pub fn from_shared(records: Arc<Vec<S>>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl<S> Clone for MemoryRepository<S> {
    fn clone(&self) -> Self {
        Self {
            records: Arc::clone(&self.records),
        }
    }
}

impl<S> SearchRepository<S> for MemoryRepository<S>
where
    S: Clone + Send + Sync + 'static,
{
    type Predicate = MemoryPredicate<S>;
    type Query = MemoryQuery<S>;

    fn count(&self, predicate: &Self::Predicate) -> Result<u64, SearchError> {
        Ok(self.records.iter().filter(|record| predicate.matches(record)).count() as u64)
    }

    fn count_async<'a>(&'a self, predicate: &'a Self::Predicate) -> BoxFuture<'a, Result<u64, SearchError>> {
        Box::pin(async move { self.count(predicate) })
    }

    fn query(&self, predicate: &Self::Predicate) -> Self::Query {
        MemoryQuery {
            records: Arc::clone(&self.records),
            predicate: predicate.clone(),
            ordering: None,
            skip: 0,
            take: None,
        }
    }
}

/// Lazy query over a [`MemoryRepository`].
pub struct MemoryQuery<S> {
    records: Arc<Vec<S>>,
    predicate: MemoryPredicate<S>,
    ordering: Option<(Vec<OrderKey<S>>, SortDirection)>,
    skip: u64,
    take: Option<u64>,
}

impl<S> MemoryQuery<S> {
    pub fn skipped(&self) -> u64 {
        self.skip
    }

    pub fn taken(&self) -> Option<u64> {
        self.take
    }

    pub fn is_ordered(&self) -> bool {
        self.ordering.is_some()
    }
}

impl<S> Queryable<S> for MemoryQuery<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn order_by(mut self, keys: &[OrderKey<S>], direction: SortDirection) -> Self {
        self.ordering = Some((keys.to_vec(), direction));
        self
    }

    fn skip(mut self, count: u64) -> Self {
        (self.skip, self.take) = compose_skip(self.skip, self.take, count);
        self
    }

    fn take(mut self, count: u64) -> Self {
        self.take = compose_take(self.take, count);
        self
    }

    fn fetch(self) -> Result<Vec<S>, SearchError> {
        let mut rows: Vec<S> = self
            .records
            .iter()
            .filter(|record| self.predicate.matches(record))
            .cloned()
            .collect();

        if let Some((keys, direction)) = &self.ordering {
            sort_by_keys(&mut rows, keys, *direction);
        }

        let skip = usize::try_from(self.skip).unwrap_or(usize::MAX);
        let take = self
            .take
            .map_or(usize::MAX, |take| usize::try_from(take).unwrap_or(usize::MAX));

        Ok(rows.into_iter().skip(skip).take(take).collect())
    }

    fn fetch_async(self) -> BoxFuture<'static, Result<Vec<S>, SearchError>> {
        Box::pin(async move { self.fetch() })
    }
}
