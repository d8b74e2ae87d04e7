//! Query input: the validated configuration of one paged search.
//!
//! Every tunable of a search (predicate, paging, ordering keys, direction,
//! projection mode, count suppression) is set on a [`QueryInputBuilder`].
//! Conflicting combinations are rejected by [`QueryInputBuilder::build`], so a
//! [`QueryInput`] that exists is always consistent.

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::query::ordering::SortDirection;
use crate::query::selector::{order_selectors, FieldPaths, OrderKey};
use crate::repository::SearchRepository;

/// Which shape, if any, the ordering keys address.
pub enum OrderMode<S, D> {
    /// Store-natural order.
    None,
    /// Keys over the source record; sorted and paged before projection.
    Source(Vec<OrderKey<S>>),
    /// Keys over the destination record; sorted and paged after projection.
    Destination(Vec<OrderKey<D>>),
}

impl<S, D> OrderMode<S, D> {
    pub fn is_none(&self) -> bool {
        matches!(self, OrderMode::None)
    }

    /// Short name used in logs and spans.
    pub fn label(&self) -> &'static str {
        match self {
            OrderMode::None => "none",
            OrderMode::Source(_) => "source",
            OrderMode::Destination(_) => "destination",
        }
    }
}

impl<S, D> Clone for OrderMode<S, D> {
    fn clone(&self) -> Self {
        match self {
            OrderMode::None => OrderMode::None,
            OrderMode::Source(keys) => OrderMode::Source(keys.clone()),
            OrderMode::Destination(keys) => OrderMode::Destination(keys.clone()),
        }
    }
}

/// Immutable configuration of a paged search.
pub struct QueryInput<S, D, R>
where
    R: SearchRepository<S>,
{
    repository: R,
    predicate: R::Predicate,
    skip: u64,
    take: u64,
    ordering: OrderMode<S, D>,
    direction: SortDirection,
    in_memory_projection: bool,
    skip_count: bool,
}

impl<S, D, R> QueryInput<S, D, R>
where
    R: SearchRepository<S>,
{
    /// Start building an input with the default [`SearchConfig`].
    pub fn builder(repository: R, predicate: R::Predicate) -> QueryInputBuilder<S, D, R> {
        QueryInputBuilder::new(repository, predicate)
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }

    pub fn predicate(&self) -> &R::Predicate {
        &self.predicate
    }

    pub fn skip(&self) -> u64 {
        self.skip
    }

    pub fn take(&self) -> u64 {
        self.take
    }

    pub fn ordering(&self) -> &OrderMode<S, D> {
        &self.ordering
    }

    pub fn direction(&self) -> SortDirection {
        self.direction
    }

    pub fn in_memory_projection(&self) -> bool {
        self.in_memory_projection
    }

    pub fn skip_count(&self) -> bool {
        self.skip_count
    }
}

/// Builder for [`QueryInput`].
///
/// # Example
///
/// ```ignore
/// let input = QueryInput::builder(&repository, MemoryPredicate::all())
///     .take(3)
///     .order_by_source_fields(&["pages"])
///     .build()?;
/// ```
pub struct QueryInputBuilder<S, D, R>
where
    R: SearchRepository<S>,
{
    repository: R,
    predicate: R::Predicate,
    skip: u64,
    take: u64,
    max_take: Option<u64>,
    source_keys: Option<Vec<OrderKey<S>>>,
    destination_keys: Option<Vec<OrderKey<D>>>,
    direction: SortDirection,
    in_memory_projection: bool,
    skip_count: bool,
}

impl<S, D, R> QueryInputBuilder<S, D, R>
where
    R: SearchRepository<S>,
{
    pub fn new(repository: R, predicate: R::Predicate) -> Self {
        Self::with_config(repository, predicate, &SearchConfig::default())
    }

    /// Start from the defaults in `config`.
    pub fn with_config(repository: R, predicate: R::Predicate, config: &SearchConfig) -> Self {
        Self {
            repository,
            predicate,
            skip: 0,
            take: config.default_take,
            max_take: config.max_take,
            source_keys: None,
            destination_keys: None,
            direction: SortDirection::from_ascending(config.order_ascending),
            in_memory_projection: config.in_memory_projection,
            skip_count: config.skip_count,
        }
    }

    pub fn skip(mut self, skip: u64) -> Self {
        self.skip = skip;
        self
    }

    pub fn take(mut self, take: u64) -> Self {
        self.take = take;
        self
    }

    /// Page `number` (1-indexed) of `size` records.
    pub fn page(mut self, number: u64, size: u64) -> Self {
        self.skip = number.saturating_sub(1).saturating_mul(size);
        self.take = size;
        self
    }

    /// Order by source-record keys (`None` = no ordering requested).
    pub fn order_by_source(mut self, keys: Option<Vec<OrderKey<S>>>) -> Self {
        self.source_keys = keys;
        self
    }

    /// Order by destination-record keys (`None` = no ordering requested).
    pub fn order_by_destination(mut self, keys: Option<Vec<OrderKey<D>>>) -> Self {
        self.destination_keys = keys;
        self
    }

    /// Resolve `names` against the source record; unknown names are dropped.
    pub fn order_by_source_fields(self, names: &[&str]) -> Self
    where
        S: FieldPaths,
    {
        let keys = order_selectors::<S>(names);
        self.order_by_source(keys)
    }

    /// Resolve `names` against the destination record; unknown names are dropped.
    pub fn order_by_destination_fields(self, names: &[&str]) -> Self
    where
        D: FieldPaths,
    {
        let keys = order_selectors::<D>(names);
        self.order_by_destination(keys)
    }

    pub fn direction(mut self, direction: SortDirection) -> Self {
        self.direction = direction;
        self
    }

    pub fn ascending(self, ascending: bool) -> Self {
        self.direction(SortDirection::from_ascending(ascending))
    }

    pub fn descending(self) -> Self {
        self.direction(SortDirection::Descending)
    }

    /// Fetch source records and convert them in memory instead of
    /// translating the conversion into the store query.
    pub fn in_memory_projection(mut self, enabled: bool) -> Self {
        self.in_memory_projection = enabled;
        self
    }

    /// Do not query the total; the result reports `0`.
    pub fn skip_count(mut self, skip_count: bool) -> Self {
        self.skip_count = skip_count;
        self
    }

    /// Validate and freeze the input.
    ///
    /// # Errors
    ///
    /// Returns `SearchError::Configuration` when both source and destination
    /// keys are supplied, or when destination keys are combined with
    /// in-memory projection.
    pub fn build(self) -> Result<QueryInput<S, D, R>, SearchError> {
        let source_keys = self.source_keys.filter(|keys| !keys.is_empty());
        let destination_keys = self.destination_keys.filter(|keys| !keys.is_empty());

        let ordering = match (source_keys, destination_keys) {
            (Some(_), Some(_)) => {
                return Err(SearchError::Configuration(
                    "ordering by source fields and by destination fields in one query is not allowed".to_string(),
                ));
            }
            (None, Some(_)) if self.in_memory_projection => {
                return Err(SearchError::Configuration(
                    "in-memory projection cannot be combined with ordering by destination fields".to_string(),
                ));
            }
            (Some(keys), None) => OrderMode::Source(keys),
            (None, Some(keys)) => OrderMode::Destination(keys),
            (None, None) => OrderMode::None,
        };

        let mut take = self.take;
        if let Some(max_take) = self.max_take {
            if take > max_take {
                log::warn!("requested page size {} exceeds the configured maximum {}, clamping", take, max_take);
                take = max_take;
            }
        }

        Ok(QueryInput {
            repository: self.repository,
            predicate: self.predicate,
            skip: self.skip,
            take,
            ordering,
            direction: self.direction,
            in_memory_projection: self.in_memory_projection,
            skip_count: self.skip_count,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field_paths;
    use crate::store::memory::{MemoryPredicate, MemoryRepository};

    #[derive(Debug, Clone)]
    struct Source {
        pages: u32,
    }

    #[derive(Debug, Clone)]
    struct View {
        page_count: u32,
    }

    field_paths!(Source { pages });
    field_paths!(View { page_count });

    type Builder<'r> = QueryInputBuilder<Source, View, &'r MemoryRepository<Source>>;

    fn builder(repository: &MemoryRepository<Source>) -> Builder<'_> {
        QueryInput::builder(repository, MemoryPredicate::all())
    }

    #[test]
    fn test_defaults() {
        let repository = MemoryRepository::new(vec![Source { pages: 1 }]);
        let input = builder(&repository).build().unwrap();

        assert_eq!(input.skip(), 0);
        assert_eq!(input.take(), SearchConfig::default().default_take);
        assert!(input.ordering().is_none());
        assert!(input.direction().is_ascending());
        assert!(!input.in_memory_projection());
        assert!(!input.skip_count());
    }

    #[test]
    fn test_both_orderings_rejected() {
        let repository = MemoryRepository::new(Vec::new());
        let err = builder(&repository)
            .order_by_source_fields(&["pages"])
            .order_by_destination_fields(&["pageCount"])
            .build()
            .err()
            .unwrap();

        assert!(err.is_configuration());
        assert!(err.to_string().contains("not allowed"));
    }

    #[test]
    fn test_destination_ordering_with_in_memory_projection_rejected() {
        let repository = MemoryRepository::new(Vec::new());
        let err = builder(&repository)
            .order_by_destination_fields(&["pageCount"])
            .in_memory_projection(true)
            .build()
            .err()
            .unwrap();

        assert!(err.is_configuration());
    }

    #[test]
    fn test_source_ordering_with_in_memory_projection_allowed() {
        let repository = MemoryRepository::new(Vec::new());
        let input = builder(&repository)
            .order_by_source_fields(&["pages"])
            .in_memory_projection(true)
            .build()
            .unwrap();

        assert_eq!(input.ordering().label(), "source");
    }

    #[test]
    fn test_unresolvable_keys_degrade_to_no_ordering() {
        let repository = MemoryRepository::new(Vec::new());
        let input = builder(&repository)
            .order_by_source_fields(&["doesNotExist"])
            .order_by_destination_fields(&["pageCount"])
            .build()
            .unwrap();

        assert_eq!(input.ordering().label(), "destination");
    }

    #[test]
    fn test_empty_key_list_is_no_ordering() {
        let repository = MemoryRepository::new(Vec::new());
        let input = builder(&repository)
            .order_by_source(Some(Vec::new()))
            .order_by_destination_fields(&["pageCount"])
            .build()
            .unwrap();

        assert_eq!(input.ordering().label(), "destination");
    }

    #[test]
    fn test_page_sets_skip_and_take() {
        let repository = MemoryRepository::new(Vec::new());
        let input = builder(&repository).page(3, 10).build().unwrap();

        assert_eq!(input.skip(), 20);
        assert_eq!(input.take(), 10);
    }

    #[test]
    fn test_config_defaults_and_clamp() {
        let repository = MemoryRepository::new(Vec::new());
        let config = SearchConfig {
            default_take: 5,
            max_take: Some(50),
            order_ascending: false,
            skip_count: true,
            in_memory_projection: true,
        };

        let input = QueryInputBuilder::<Source, View, _>::with_config(&repository, MemoryPredicate::all(), &config)
            .build()
            .unwrap();
        assert_eq!(input.take(), 5);
        assert!(!input.direction().is_ascending());
        assert!(input.skip_count());
        assert!(input.in_memory_projection());

        let clamped = QueryInputBuilder::<Source, View, _>::with_config(&repository, MemoryPredicate::all(), &config)
            .take(500)
            .build()
            .unwrap();
        assert_eq!(clamped.take(), 50);
    }
}
