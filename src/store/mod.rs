//! Store bindings for the search pipeline.
//!
//! - [`memory`]: records held in memory, filtered by a closure
//! - [`sql`]: one PostgreSQL table, filtered by a `sea_query::Condition`

pub mod memory;
pub mod sql;

pub(crate) mod value_conversion;

#[doc(inline)]
pub use memory::{MemoryPredicate, MemoryQuery, MemoryRepository};
#[doc(inline)]
pub use sql::{ColumnProjection, FromRow, SqlName, SqlProjection, SqlQuery, SqlRepository};
