//! Order-selector builder.
//!
//! Turns property-name strings (dot-separated chains allowed) into
//! [`OrderKey`] accessors. Resolution happens once, when the selectors are
//! built, through the [`FieldPaths`] trait that the [`field_paths!`](crate::field_paths)
//! macro implements for a record type.
//!
//! Names are normalized segment by segment to snake_case, so `"Pages"`,
//! `"pageCount"` and `"page_count"` all address the `page_count` field.
//! A name that fails to resolve is dropped, and an empty result is reported as
//! `None` ("no ordering").

use crate::error::SearchError;
use crate::value::SortValue;
use convert_case::{Case, Casing};
use std::fmt;
use std::sync::Arc;

/// Static reflection over the fields a record exposes for ordering.
///
/// Usually implemented with [`field_paths!`](crate::field_paths):
///
/// ```ignore
/// pagesearch::field_paths!(Address { city, zip });
/// pagesearch::field_paths!(Book { title, pages, address: Address });
/// ```
pub trait FieldPaths: Sized + 'static {
    /// Resolve normalized path segments starting at this type.
    fn resolve(segments: &[String]) -> Option<OrderKey<Self>>;
}

/// Accessor for one ordering key of `T`.
pub struct OrderKey<T> {
    path: Vec<&'static str>,
    extract: Arc<dyn Fn(&T) -> SortValue + Send + Sync>,
}

impl<T> Clone for OrderKey<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            extract: Arc::clone(&self.extract),
        }
    }
}

impl<T> fmt::Debug for OrderKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OrderKey").field("path", &self.path).finish()
    }
}

impl<T: 'static> OrderKey<T> {
    /// Terminal key reading a single field.
    pub fn leaf<F>(name: &'static str, extract: F) -> Self
    where
        F: Fn(&T) -> SortValue + Send + Sync + 'static,
    {
        Self {
            path: vec![name],
            extract: Arc::new(extract),
        }
    }

    /// Key reaching through the nested record `U` stored in field `name`.
    ///
    /// `rest` is the remainder of the path, resolved against `U`. Returns
    /// `None` when `rest` is empty (a nested record is not itself a sort key)
    /// or does not resolve.
    pub fn nested<U, G>(name: &'static str, get: G, rest: &[String]) -> Option<Self>
    where
        U: FieldPaths,
        G: Fn(&T) -> &U + Send + Sync + 'static,
    {
        if rest.is_empty() {
            return None;
        }
        let inner = U::resolve(rest)?;

        let mut path = Vec::with_capacity(inner.path.len() + 1);
        path.push(name);
        path.extend(inner.path.iter().copied());

        let inner_extract = inner.extract;
        Some(Self {
            path,
            extract: Arc::new(move |record: &T| (*inner_extract)(get(record))),
        })
    }
}

impl<T> OrderKey<T> {
    /// Canonical field names from the root type to the terminal field.
    pub fn path(&self) -> &[&'static str] {
        &self.path
    }

    /// Flat column name for stores: the path joined with `_`
    /// (`address.city` → `address_city`).
    pub fn column(&self) -> String {
        self.path.join("_")
    }

    /// Read this key from a record.
    pub fn value_of(&self, record: &T) -> SortValue {
        (*self.extract)(record)
    }
}

/// Split a property name into normalized segments.
///
/// Returns `None` when any segment is empty.
pub(crate) fn normalize_path(name: &str) -> Option<Vec<String>> {
    name.split('.')
        .map(|segment| {
            let segment = segment.trim();
            if segment.is_empty() {
                None
            } else {
                Some(segment.to_case(Case::Snake))
            }
        })
        .collect()
}

/// True when the normalized `segment` names the field `field`.
///
/// The field name goes through the same snake_case conversion as the
/// requested segment, so names containing digits (`line1`, `isbn13`) match
/// whether the caller writes them as declared or in another case.
#[doc(hidden)]
pub fn matches_field(segment: &str, field: &str) -> bool {
    segment == field || segment == field.to_case(Case::Snake)
}

/// Resolve a single property name against `T`.
pub fn resolve_order_key<T: FieldPaths>(name: &str) -> Option<OrderKey<T>> {
    let segments = normalize_path(name)?;
    T::resolve(&segments)
}

/// Build ordering keys for `T` from property names.
///
/// Blank names are skipped and names that do not resolve are dropped. Returns
/// `None` if no key survives, which callers treat exactly like "no ordering
/// requested".
pub fn order_selectors<T: FieldPaths>(names: &[&str]) -> Option<Vec<OrderKey<T>>> {
    let mut keys = Vec::with_capacity(names.len());

    for name in names {
        if name.trim().is_empty() {
            continue;
        }
        match resolve_order_key::<T>(name) {
            Some(key) => keys.push(key),
            None => log::debug!(
                "dropping ordering field `{}`: not a sortable path of {}",
                name,
                std::any::type_name::<T>()
            ),
        }
    }

    if keys.is_empty() {
        None
    } else {
        Some(keys)
    }
}

/// Build ordering keys for a single property name, unless it is blank or
/// vetoed by `excluded` (e.g. a computed field the store cannot sort on).
pub fn one_order_selector<T: FieldPaths>(name: &str, excluded: &[&str]) -> Option<Vec<OrderKey<T>>> {
    if name.trim().is_empty() || excluded.contains(&name) {
        return None;
    }
    order_selectors::<T>(&[name])
}

/// Strict variant of [`order_selectors`]: a non-blank name that does not
/// resolve is an error instead of being dropped.
pub fn try_order_selectors<T: FieldPaths>(names: &[&str]) -> Result<Option<Vec<OrderKey<T>>>, SearchError> {
    let mut keys = Vec::with_capacity(names.len());

    for name in names.iter().filter(|name| !name.trim().is_empty()) {
        let key = resolve_order_key::<T>(name).ok_or_else(|| {
            SearchError::UnknownField(format!("`{}` on {}", name, std::any::type_name::<T>()))
        })?;
        keys.push(key);
    }

    Ok(if keys.is_empty() { None } else { Some(keys) })
}
