//! # pagesearch
//!
//! Paged search over pluggable repositories for the `may` coroutine runtime.
//!
//! A search filters a repository with a predicate, counts the matches once,
//! orders by keys resolved from field names (`"address.city"`), pages the
//! result and projects it into a destination shape. The same pipeline runs
//! blocking (`SearchQuery::execute`), non-blocking
//! (`SearchQuery::execute_async`) or on its own coroutine
//! (`SearchQuery::spawn`).
//!
//! Two stores ship with the crate: [`MemoryRepository`] for in-memory
//! collections and [`SqlRepository`], which pushes filtering, ordering,
//! paging and column projection into PostgreSQL via `may_postgres`.

pub mod config;
pub mod error;
pub mod executor;
mod macros;
pub mod metrics;
pub mod projection;
pub mod query;
pub mod repository;
pub mod store;
pub mod value;

pub use config::SearchConfig;
pub use error::SearchError;
pub use executor::{connect, MayPostgresExecutor, StoreExecutor};
pub use projection::{Identity, MapProjector, Projector};
pub use query::{
    one_order_selector, order_selectors, try_order_selectors, FieldPaths, OrderKey, OrderMode, PagedResult,
    QueryInput, QueryInputBuilder, SearchHandle, SearchQuery, SortDirection,
};
pub use repository::{BoxFuture, Queryable, SearchRepository};
pub use store::{
    ColumnProjection, FromRow, MemoryPredicate, MemoryQuery, MemoryRepository, SqlName, SqlProjection, SqlQuery,
    SqlRepository,
};
pub use value::SortValue;
