//! Error type shared by the search pipeline, the selector builder and the
//! store bindings.
//!
//! Configuration errors are programmer errors and are reported when a
//! [`QueryInput`](crate::query::QueryInput) is built. Store errors are passed
//! through unchanged; nothing in this crate retries or suppresses them.

use may_postgres::Error as PostgresError;
use std::fmt;

/// `SearchError` error type
#[derive(Debug)]
pub enum SearchError {
    /// Invalid query input (conflicting ordering, incompatible projection mode)
    Configuration(String),
    /// Ordering field that could not be resolved in strict selector mode
    UnknownField(String),
    /// `PostgreSQL` error from `may_postgres`
    Postgres(PostgresError),
    /// Backing store failure reported by a repository implementation
    Store(String),
    /// Row parsing/conversion error
    Parse(String),
    /// Shape conversion failure
    Projection(String),
    /// A coroutine running a search panicked
    Coroutine(String),
}

impl SearchError {
    /// True for errors raised while validating query input.
    pub fn is_configuration(&self) -> bool {
        matches!(self, SearchError::Configuration(_))
    }
}

impl fmt::Display for SearchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SearchError::Configuration(s) => write!(f, "Invalid search configuration: {s}"),
            SearchError::UnknownField(s) => write!(f, "Unknown ordering field: {s}"),
            SearchError::Postgres(e) => write!(f, "PostgreSQL error: {e}"),
            SearchError::Store(s) => write!(f, "Store error: {s}"),
            SearchError::Parse(s) => write!(f, "Parse error: {s}"),
            SearchError::Projection(s) => write!(f, "Projection error: {s}"),
            SearchError::Coroutine(s) => write!(f, "Search coroutine failed: {s}"),
        }
    }
}

impl std::error::Error for SearchError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SearchError::Postgres(e) => Some(e),
            _ => None,
        }
    }
}

impl From<PostgresError> for SearchError {
    fn from(err: PostgresError) -> Self {
        SearchError::Postgres(err)
    }
}
