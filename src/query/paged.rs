//! One page of search results plus the unpaged total.

use serde::{Deserialize, Serialize};

/// A page of records and the number of records matching the predicate
/// before paging (`0` when counting was skipped).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PagedResult<T> {
    pub total: u64,
    pub items: Vec<T>,
}

impl<T> PagedResult<T> {
    pub fn new(total: u64, items: Vec<T>) -> Self {
        Self { total, items }
    }

    /// Number of records on this page.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.items.iter()
    }

    /// Convert every item, keeping the total.
    pub fn map<U, F>(self, f: F) -> PagedResult<U>
    where
        F: FnMut(T) -> U,
    {
        PagedResult {
            total: self.total,
            items: self.items.into_iter().map(f).collect(),
        }
    }

    pub fn into_parts(self) -> (u64, Vec<T>) {
        (self.total, self.items)
    }
}

impl<T> Default for PagedResult<T> {
    fn default() -> Self {
        Self {
            total: 0,
            items: Vec::new(),
        }
    }
}

impl<T> IntoIterator for PagedResult<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.into_iter()
    }
}
