//! Multi-key ordering shared by the in-memory store and the post-projection
//! phase of the search pipeline.

use crate::query::selector::OrderKey;
use crate::value::SortValue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Direction applied uniformly to every key of an ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    #[default]
    Ascending,
    Descending,
}

impl SortDirection {
    pub fn from_ascending(ascending: bool) -> Self {
        if ascending {
            SortDirection::Ascending
        } else {
            SortDirection::Descending
        }
    }

    pub fn is_ascending(self) -> bool {
        self == SortDirection::Ascending
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            SortDirection::Ascending => ordering,
            SortDirection::Descending => ordering.reverse(),
        }
    }
}

/// Compare two records key by key: the first key decides, later keys only
/// break ties.
pub fn compare_by_keys<T>(a: &T, b: &T, keys: &[OrderKey<T>], direction: SortDirection) -> Ordering {
    keys.iter()
        .map(|key| direction.apply(key.value_of(a).cmp(&key.value_of(b))))
        .find(|ordering| ordering.is_ne())
        .unwrap_or(Ordering::Equal)
}

/// Stable sort of `items` by `keys`.
///
/// Each key is read once per item before sorting; records that compare equal
/// on every key keep their relative order.
pub fn sort_by_keys<T>(items: &mut Vec<T>, keys: &[OrderKey<T>], direction: SortDirection) {
    if keys.is_empty() || items.len() < 2 {
        return;
    }

    let mut decorated: Vec<(Vec<SortValue>, T)> = items
        .drain(..)
        .map(|item| (keys.iter().map(|key| key.value_of(&item)).collect(), item))
        .collect();

    decorated.sort_by(|(a, _), (b, _)| {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| direction.apply(x.cmp(y)))
            .find(|ordering| ordering.is_ne())
            .unwrap_or(Ordering::Equal)
    });

    items.extend(decorated.into_iter().map(|(_, item)| item));
}
