//! Building and executing paged searches.
//!
//! # Architecture
//!
//! - **Selector**: ordering keys resolved from field names (`order_selectors`)
//! - **Ordering**: sort direction and key-based comparison
//! - **Input**: validated search configuration (`QueryInput`)
//! - **Search**: the execution pipeline (`SearchQuery`)
//! - **Paged**: the result page (`PagedResult`)
//!
//! # Examples
//!
//! ```
//! use pagesearch::{field_paths, MemoryPredicate, MemoryRepository, QueryInput, SearchQuery};
//!
//! #[derive(Debug, Clone)]
//! struct Book {
//!     title: String,
//!     pages: u32,
//! }
//!
//! field_paths!(Book { title, pages });
//!
//! # fn main() -> Result<(), pagesearch::SearchError> {
//! let repository = MemoryRepository::new(vec![
//!     Book { title: "A".into(), pages: 100 },
//!     Book { title: "B".into(), pages: 20 },
//! ]);
//!
//! let input = QueryInput::<Book, Book, _>::builder(&repository, MemoryPredicate::all())
//!     .take(1)
//!     .order_by_source_fields(&["pages"])
//!     .build()?;
//!
//! let page = SearchQuery::identity(input).execute()?;
//! assert_eq!(page.total, 2);
//! assert_eq!(page.items[0].pages, 20);
//! # Ok(())
//! # }
//! ```

pub mod input;
pub mod ordering;
pub mod paged;
pub mod search;
pub mod selector;

pub use input::{OrderMode, QueryInput, QueryInputBuilder};
pub use ordering::{compare_by_keys, sort_by_keys, SortDirection};
pub use paged::PagedResult;
pub use search::{SearchHandle, SearchQuery};
pub use selector::{one_order_selector, order_selectors, resolve_order_key, try_order_selectors, FieldPaths, OrderKey};
