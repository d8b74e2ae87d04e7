//! Search repository contract.
//!
//! A [`SearchRepository`] turns a predicate into a lazily evaluated
//! [`Queryable`] and can count the records a predicate matches. The search
//! pipeline composes ordering and paging onto the queryable before anything
//! is materialized, so stores that understand those operations (SQL) push
//! them down, while simple stores apply them at fetch time.
//!
//! Every I/O operation has a blocking and a non-blocking form. Both must
//! return the same data for the same predicate/ordering/paging.

use crate::error::SearchError;
use crate::query::ordering::SortDirection;
use crate::query::selector::OrderKey;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Boxed future returned by the non-blocking repository and projector forms.
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// Store that can filter, count and hand out composable queries over `S`.
pub trait SearchRepository<S> {
    /// Filter understood by the store.
    type Predicate;
    /// Lazily evaluated, composable query handle.
    type Query: Queryable<S>;

    /// Number of records matching `predicate`.
    fn count(&self, predicate: &Self::Predicate) -> Result<u64, SearchError>;

    /// Non-blocking form of [`count`](Self::count).
    fn count_async<'a>(&'a self, predicate: &'a Self::Predicate) -> BoxFuture<'a, Result<u64, SearchError>>;

    /// Filtered query. Performs no I/O.
    fn query(&self, predicate: &Self::Predicate) -> Self::Query;
}

/// Lazily evaluated query handle.
///
/// `skip` and `take` compose like sequence operators: `take(10).skip(3)`
/// yields 7 records. `order_by` replaces any previous ordering.
pub trait Queryable<S>: Sized {
    fn order_by(self, keys: &[OrderKey<S>], direction: SortDirection) -> Self;

    fn skip(self, count: u64) -> Self;

    fn take(self, count: u64) -> Self;

    /// Execute the query and materialize the records.
    fn fetch(self) -> Result<Vec<S>, SearchError>;

    /// Non-blocking form of [`fetch`](Self::fetch).
    fn fetch_async(self) -> BoxFuture<'static, Result<Vec<S>, SearchError>>;
}

impl<S, R> SearchRepository<S> for &R
where
    R: SearchRepository<S> + ?Sized,
{
    type Predicate = R::Predicate;
    type Query = R::Query;

    fn count(&self, predicate: &Self::Predicate) -> Result<u64, SearchError> {
        (**self).count(predicate)
    }

    fn count_async<'a>(&'a self, predicate: &'a Self::Predicate) -> BoxFuture<'a, Result<u64, SearchError>> {
        (**self).count_async(predicate)
    }

    fn query(&self, predicate: &Self::Predicate) -> Self::Query {
        (**self).query(predicate)
    }
}

impl<S, R> SearchRepository<S> for Arc<R>
where
    R: SearchRepository<S> + ?Sized,
{
    type Predicate = R::Predicate;
    type Query = R::Query;

    fn count(&self, predicate: &Self::Predicate) -> Result<u64, SearchError> {
        (**self).count(predicate)
    }

    fn count_async<'a>(&'a self, predicate: &'a Self::Predicate) -> BoxFuture<'a, Result<u64, SearchError>> {
        (**self).count_async(predicate)
    }

    fn query(&self, predicate: &Self::Predicate) -> Self::Query {
        (**self).query(predicate)
    }
}

/// Compose a `skip` onto an optional `take`, sequence style.
pub(crate) fn compose_skip(skip: u64, take: Option<u64>, count: u64) -> (u64, Option<u64>) {
    (skip.saturating_add(count), take.map(|t| t.saturating_sub(count)))
}

/// Compose a `take` onto an optional `take`.
pub(crate) fn compose_take(take: Option<u64>, count: u64) -> Option<u64> {
    Some(take.map_or(count, |t| t.min(count)))
}
