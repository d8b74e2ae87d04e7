//! Paged search execution.
//!
//! A [`SearchQuery`] pairs a validated [`QueryInput`] with a [`Projector`] and
//! produces [`PagedResult`]s. Both execution forms run the same pipeline:
//!
//! 1. filter the repository with the input predicate
//! 2. count the filtered records once per query instance (or report `0`)
//! 3. with source keys, order and page the store query
//! 4. project, either store-side or by fetching and mapping in memory
//! 5. with destination keys, sort and page the projected records
//! 6. without keys, page the projected records as they came
//!
//! The total is memoized, so re-executing a query for another page never
//! issues a second count.

use crate::error::SearchError;
use crate::projection::{Identity, Projector};
use crate::query::input::{OrderMode, QueryInput};
use crate::query::ordering::sort_by_keys;
use crate::query::paged::PagedResult;
use crate::repository::{Queryable, SearchRepository};
use std::time::Instant;

#[cfg(feature = "tracing")]
use crate::metrics::tracing_helpers;
#[cfg(feature = "metrics")]
use crate::metrics::METRICS;

/// Executable paged search from `S` records to `D` results.
pub struct SearchQuery<S, D, R, P>
where
    R: SearchRepository<S>,
{
    input: QueryInput<S, D, R>,
    projector: P,
    total: Option<u64>,
}

impl<S, R> SearchQuery<S, S, R, Identity>
where
    R: SearchRepository<S>,
{
    /// Search that returns source records unchanged.
    pub fn identity(input: QueryInput<S, S, R>) -> Self {
        Self::new(input, Identity)
    }
}

impl<S, D, R, P> SearchQuery<S, D, R, P>
where
    R: SearchRepository<S>,
    P: Projector<S, D, R::Query>,
{
    pub fn new(input: QueryInput<S, D, R>, projector: P) -> Self {
        Self {
            input,
            projector,
            total: None,
        }
    }

    pub fn input(&self) -> &QueryInput<S, D, R> {
        &self.input
    }

    pub fn projector(&self) -> &P {
        &self.projector
    }

    /// Memoized total; `None` until the first execution.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    /// Run the search, blocking the current coroutine or thread.
    ///
    /// # Errors
    ///
    /// Propagates repository and projection failures unchanged.
    pub fn execute(&mut self) -> Result<PagedResult<D>, SearchError> {
        #[cfg(feature = "tracing")]
        let _span = tracing_helpers::execute_search_span(std::any::type_name::<S>(), self.input.ordering().label())
            .entered();

        let start = Instant::now();
        let filtered = self.input.repository().query(self.input.predicate());

        let total = match self.total {
            Some(total) => total,
            None => {
                let total = if self.input.skip_count() {
                    0
                } else {
                    #[cfg(feature = "metrics")]
                    METRICS.record_count_query();
                    self.input.repository().count(self.input.predicate())?
                };
                self.total = Some(total);
                total
            }
        };

        let staged = self.stage(filtered);
        let projected = if self.input.in_memory_projection() {
            staged
                .fetch()?
                .into_iter()
                .map(|source| self.projector.map(source))
                .collect()
        } else {
            self.projector.project(staged)?
        };

        Ok(self.finish(total, projected, start))
    }

    /// Non-blocking form of [`execute`](Self::execute); same pipeline, same
    /// results.
    ///
    /// # Errors
    ///
    /// Propagates repository and projection failures unchanged.
    pub async fn execute_async<'q>(&'q mut self) -> Result<PagedResult<D>, SearchError>
    where
        P: Sync,
        S: Send,
        D: Send,
        R::Query: 'q,
    {
        #[cfg(feature = "tracing")]
        let span = tracing_helpers::execute_search_span(std::any::type_name::<S>(), self.input.ordering().label());

        let run = self.run_async();
        #[cfg(feature = "tracing")]
        let run = tracing::Instrument::instrument(run, span);
        run.await
    }

    async fn run_async<'q>(&'q mut self) -> Result<PagedResult<D>, SearchError>
    where
        P: Sync,
        S: Send,
        D: Send,
        R::Query: 'q,
    {
        let start = Instant::now();
        let filtered = self.input.repository().query(self.input.predicate());

        let total = match self.total {
            Some(total) => total,
            None => {
                let total = if self.input.skip_count() {
                    0
                } else {
                    #[cfg(feature = "metrics")]
                    METRICS.record_count_query();
                    self.input.repository().count_async(self.input.predicate()).await?
                };
                self.total = Some(total);
                total
            }
        };

        let staged = self.stage(filtered);
        let projected = if self.input.in_memory_projection() {
            staged
                .fetch_async()
                .await?
                .into_iter()
                .map(|source| self.projector.map(source))
                .collect()
        } else {
            self.projector.project_async(staged).await?
        };

        Ok(self.finish(total, projected, start))
    }

    /// Run the search on a new `may` coroutine.
    pub fn spawn(self) -> SearchHandle<D>
    where
        Self: Send + 'static,
        D: Send + 'static,
    {
        let handle = may::go!(move || {
            let mut query = self;
            query.execute()
        });
        SearchHandle { handle }
    }

    /// Source-ordered searches sort and page inside the store query.
    fn stage(&self, filtered: R::Query) -> R::Query {
        match self.input.ordering() {
            OrderMode::Source(keys) => filtered
                .order_by(keys, self.input.direction())
                .skip(self.input.skip())
                .take(self.input.take()),
            _ => filtered,
        }
    }

    fn finish(&self, total: u64, projected: Vec<D>, start: Instant) -> PagedResult<D> {
        let items = match self.input.ordering() {
            OrderMode::Source(_) => projected,
            OrderMode::Destination(keys) => {
                let mut projected = projected;
                sort_by_keys(&mut projected, keys, self.input.direction());
                page(projected, self.input.skip(), self.input.take())
            }
            OrderMode::None => page(projected, self.input.skip(), self.input.take()),
        };

        let elapsed = start.elapsed();
        log::debug!(
            "search over {} returned {} of {} records in {:?} (ordering: {})",
            std::any::type_name::<S>(),
            items.len(),
            total,
            elapsed,
            self.input.ordering().label()
        );
        #[cfg(feature = "metrics")]
        METRICS.record_search(elapsed, items.len());

        PagedResult::new(total, items)
    }
}

fn page<T>(items: Vec<T>, skip: u64, take: u64) -> Vec<T> {
    let skip = usize::try_from(skip).unwrap_or(usize::MAX);
    let take = usize::try_from(take).unwrap_or(usize::MAX);
    items.into_iter().skip(skip).take(take).collect()
}

/// Pending search running on a coroutine.
pub struct SearchHandle<D> {
    handle: may::coroutine::JoinHandle<Result<PagedResult<D>, SearchError>>,
}

impl<D> SearchHandle<D> {
    /// Wait for the coroutine to finish.
    ///
    /// # Errors
    ///
    /// Returns the search's own error, or `SearchError::Coroutine` if the
    /// coroutine panicked.
    pub fn join(self) -> Result<PagedResult<D>, SearchError> {
        match self.handle.join() {
            Ok(result) => result,
            Err(e) => Err(SearchError::Coroutine(format!("{:?}", e))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_paths;
    use crate::projection::MapProjector;
    use crate::query::input::QueryInputBuilder;
    use crate::query::ordering::SortDirection;
    use crate::repository::BoxFuture;
    use crate::store::memory::{MemoryPredicate, MemoryQuery, MemoryRepository};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq)]
    struct Book {
        title: String,
        pages: u32,
    }

    #[derive(Debug, Clone, PartialEq)]
    struct BookCard {
        label: String,
        page_count: u32,
    }

    field_paths!(Book { title, pages });
    field_paths!(BookCard { label, page_count });

    fn books() -> MemoryRepository<Book> {
        let rows = [("E", 50), ("A", 100), ("C", 20), ("B", 80), ("D", 200)];
        MemoryRepository::new(
            rows.iter()
                .map(|(title, pages)| Book {
                    title: title.to_string(),
                    pages: *pages,
                })
                .collect(),
        )
    }

    fn card(book: Book) -> BookCard {
        BookCard {
            label: format!("{} ({}p)", book.title, book.pages),
            page_count: book.pages,
        }
    }

    fn search<R: SearchRepository<Book>>(repository: R, predicate: R::Predicate) -> QueryInputBuilder<Book, Book, R> {
        QueryInput::builder(repository, predicate)
    }

    fn card_search<R: SearchRepository<Book>>(
        repository: R,
        predicate: R::Predicate,
    ) -> QueryInputBuilder<Book, BookCard, R> {
        QueryInput::builder(repository, predicate)
    }

    fn pages(result: &PagedResult<Book>) -> Vec<u32> {
        result.iter().map(|book| book.pages).collect()
    }

    /// Counts how often the wrapped repository is asked for a total.
    struct CountingRepository {
        inner: MemoryRepository<Book>,
        counts: Arc<AtomicUsize>,
    }

    impl SearchRepository<Book> for CountingRepository {
        type Predicate = MemoryPredicate<Book>;
        type Query = MemoryQuery<Book>;

        fn count(&self, predicate: &Self::Predicate) -> Result<u64, SearchError> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            self.inner.count(predicate)
        }

        fn count_async<'a>(&'a self, predicate: &'a Self::Predicate) -> BoxFuture<'a, Result<u64, SearchError>> {
            self.counts.fetch_add(1, Ordering::SeqCst);
            self.inner.count_async(predicate)
        }

        fn query(&self, predicate: &Self::Predicate) -> Self::Query {
            self.inner.query(predicate)
        }
    }

    /// Repository whose count always fails.
    struct BrokenCount(MemoryRepository<Book>);

    impl SearchRepository<Book> for BrokenCount {
        type Predicate = MemoryPredicate<Book>;
        type Query = MemoryQuery<Book>;

        fn count(&self, _: &Self::Predicate) -> Result<u64, SearchError> {
            Err(SearchError::Store("count unavailable".to_string()))
        }

        fn count_async<'a>(&'a self, predicate: &'a Self::Predicate) -> BoxFuture<'a, Result<u64, SearchError>> {
            Box::pin(async move { self.count(predicate) })
        }

        fn query(&self, predicate: &Self::Predicate) -> Self::Query {
            self.0.query(predicate)
        }
    }

    #[test]
    fn test_first_page_by_pages_ascending() {
        let repository = books();
        let input = search(&repository, MemoryPredicate::all())
            .take(3)
            .order_by_source_fields(&["pages"])
            .build()
            .unwrap();

        let result = SearchQuery::identity(input).execute().unwrap();

        assert_eq!(result.total, 5);
        assert_eq!(pages(&result), vec![20, 50, 80]);
    }

    #[test]
    fn test_descending_second_page() {
        let repository = books();
        let input = search(&repository, MemoryPredicate::all())
            .skip(2)
            .take(2)
            .order_by_source_fields(&["pages"])
            .descending()
            .build()
            .unwrap();

        let result = SearchQuery::identity(input).execute().unwrap();
        assert_eq!(pages(&result), vec![80, 50]);
    }

    #[test]
    fn test_total_counts_filtered_records_only() {
        let repository = books();
        let input = search(&repository, MemoryPredicate::new(|b: &Book| b.pages >= 80))
            .take(1)
            .build()
            .unwrap();

        let result = SearchQuery::identity(input).execute().unwrap();
        assert_eq!(result.total, 3);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn test_page_length_is_bounded_by_remaining_records() {
        let repository = books();
        for (skip, take, expected) in [(0, 10, 5), (3, 10, 2), (5, 2, 0), (9, 3, 0), (1, 0, 0)] {
            let input = search(&repository, MemoryPredicate::all())
                .skip(skip)
                .take(take)
                .order_by_source_fields(&["title"])
                .build()
                .unwrap();
            let result = SearchQuery::identity(input).execute().unwrap();
            assert_eq!(result.len(), expected, "skip={} take={}", skip, take);
            assert_eq!(result.total, 5);
        }
    }

    #[test]
    fn test_skip_count_reports_zero_without_counting() {
        let counts = Arc::new(AtomicUsize::new(0));
        let repository = CountingRepository {
            inner: books(),
            counts: Arc::clone(&counts),
        };
        let input = search(&repository, MemoryPredicate::all())
            .take(2)
            .skip_count(true)
            .build()
            .unwrap();

        let result = SearchQuery::identity(input).execute().unwrap();
        assert_eq!(result.total, 0);
        assert_eq!(result.len(), 2);
        assert_eq!(counts.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_total_is_memoized_across_executions() {
        let counts = Arc::new(AtomicUsize::new(0));
        let repository = CountingRepository {
            inner: books(),
            counts: Arc::clone(&counts),
        };
        let input = search(&repository, MemoryPredicate::all())
            .take(2)
            .build()
            .unwrap();
        let mut query = SearchQuery::identity(input);
        assert_eq!(query.total(), None);

        let first = query.execute().unwrap();
        let second = query.execute().unwrap();

        assert_eq!(first.total, 5);
        assert_eq!(second.total, 5);
        assert_eq!(query.total(), Some(5));
        assert_eq!(counts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_count_failure_propagates() {
        let repository = BrokenCount(books());
        let input = search(&repository, MemoryPredicate::all())
            .build()
            .unwrap();

        let err = SearchQuery::identity(input).execute().err().unwrap();
        assert!(err.to_string().contains("count unavailable"));
    }

    #[test]
    fn test_destination_ordering_sorts_projected_records() {
        let repository = books();
        let input = card_search(&repository, MemoryPredicate::all())
            .skip(1)
            .take(2)
            .order_by_destination_fields(&["pageCount"])
            .descending()
            .build()
            .unwrap();

        let result = SearchQuery::new(input, MapProjector::new(card)).execute().unwrap();

        assert_eq!(result.total, 5);
        let counts: Vec<u32> = result.iter().map(|c| c.page_count).collect();
        assert_eq!(counts, vec![100, 80]);
    }

    #[test]
    fn test_in_memory_projection_with_source_ordering() {
        let repository = books();
        let input = card_search(&repository, MemoryPredicate::all())
            .take(2)
            .order_by_source_fields(&["title"])
            .in_memory_projection(true)
            .build()
            .unwrap();

        let result = SearchQuery::new(input, MapProjector::new(card)).execute().unwrap();
        let labels: Vec<&str> = result.iter().map(|c| c.label.as_str()).collect();
        assert_eq!(labels, vec!["A (100p)", "B (80p)"]);
    }

    #[test]
    fn test_unordered_search_pages_natural_order() {
        let repository = books();
        let input = search(&repository, MemoryPredicate::all())
            .skip(1)
            .take(2)
            .build()
            .unwrap();

        let result = SearchQuery::identity(input).execute().unwrap();
        assert_eq!(pages(&result), vec![100, 20]);
    }

    #[test]
    fn test_unknown_sort_field_falls_back_to_natural_order() {
        let repository = books();
        let input = search(&repository, MemoryPredicate::all())
            .take(2)
            .order_by_source_fields(&["doesNotExist"])
            .build()
            .unwrap();

        let result = SearchQuery::identity(input).execute().unwrap();
        assert_eq!(pages(&result), vec![50, 100]);
    }

    #[tokio::test]
    async fn test_async_matches_blocking() {
        let repository = books();
        let build = || {
            card_search(&repository, MemoryPredicate::new(|b: &Book| b.pages > 20))
                .skip(1)
                .take(2)
                .order_by_source_fields(&["pages"])
                .direction(SortDirection::Descending)
                .build()
                .unwrap()
        };

        let blocking = SearchQuery::new(build(), MapProjector::new(card)).execute().unwrap();
        let non_blocking = SearchQuery::new(build(), MapProjector::new(card))
            .execute_async()
            .await
            .unwrap();

        assert_eq!(blocking, non_blocking);
        assert_eq!(non_blocking.total, 4);
    }

    #[tokio::test]
    async fn test_async_total_is_memoized() {
        let counts = Arc::new(AtomicUsize::new(0));
        let repository = CountingRepository {
            inner: books(),
            counts: Arc::clone(&counts),
        };
        let input = search(&repository, MemoryPredicate::all())
            .take(1)
            .build()
            .unwrap();
        let mut query = SearchQuery::identity(input);

        query.execute_async().await.unwrap();
        query.execute_async().await.unwrap();
        query.execute().unwrap();

        assert_eq!(counts.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_spawn_runs_on_coroutine() {
        let input = search(books(), MemoryPredicate::all())
            .take(3)
            .order_by_source_fields(&["pages"])
            .build()
            .unwrap();

        let result = SearchQuery::identity(input).spawn().join().unwrap();
        assert_eq!(result.total, 5);
        assert_eq!(pages(&result), vec![20, 50, 80]);
    }
}
