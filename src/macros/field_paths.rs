/// Implement [`FieldPaths`](crate::FieldPaths) for a record type.
///
/// Plain fields are terminal ordering keys; their type must convert into a
/// [`SortValue`](crate::SortValue) through `From<&T>`. Fields written as
/// `field: Type` hold a nested record and forward the rest of the path to
/// `Type`, which must implement `FieldPaths` itself.
///
/// The record may be named by a path (`models::Book`). Generic records are
/// not supported; implement `FieldPaths` by hand with
/// [`OrderKey::leaf`](crate::OrderKey::leaf) and
/// [`OrderKey::nested`](crate::OrderKey::nested) for those.
///
/// # Example
///
/// ```
/// use pagesearch::{field_paths, order_selectors};
///
/// struct Address { city: String }
/// struct Book { title: String, pages: u32, address: Address }
///
/// field_paths!(Address { city });
/// field_paths!(Book { title, pages, address: Address });
///
/// let keys = order_selectors::<Book>(&["pages", "address.city"]).unwrap();
/// assert_eq!(keys[1].column(), "address_city");
/// ```
#[macro_export]
macro_rules! field_paths {
    ($ty:path { $( $field:ident $(: $nested:ty)? ),* $(,)? }) => {
        impl $crate::FieldPaths for $ty {
            fn resolve(segments: &[::std::string::String]) -> ::std::option::Option<$crate::OrderKey<Self>> {
                let (head, rest) = segments.split_first()?;
                $(
                    if $crate::query::selector::matches_field(head, stringify!($field)) {
                        return $crate::__field_path_key!($ty, $field, rest $(, $nested)?);
                    }
                )*
                let _ = rest;
                ::std::option::Option::None
            }
        }
    };
}

#[doc(hidden)]
#[macro_export]
macro_rules! __field_path_key {
    ($ty:path, $field:ident, $rest:ident) => {
        if $rest.is_empty() {
            ::std::option::Option::Some($crate::OrderKey::<$ty>::leaf(
                stringify!($field),
                |record: &$ty| $crate::SortValue::from(&record.$field),
            ))
        } else {
            ::std::option::Option::None
        }
    };
    ($ty:path, $field:ident, $rest:ident, $nested:ty) => {
        $crate::OrderKey::<$ty>::nested::<$nested, _>(
            stringify!($field),
            |record: &$ty| &record.$field,
            $rest,
        )
    };
}
