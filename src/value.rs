//! Comparable value representation for ordering keys.
//!
//! Every terminal property addressed by an [`OrderKey`](crate::query::OrderKey)
//! is boxed into a [`SortValue`], so keys of different Rust types can be
//! compared uniformly by the multi-key sort.
//!
//! Ordering rules:
//! - `Null` sorts before every other value
//! - integers, floats and decimals compare numerically with each other
//! - other kinds compare by kind rank (bool < number < text < date <
//!   timestamp < uuid), then by natural order

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::cmp::Ordering;
use uuid::Uuid;

/// A boxed ordering key value.
#[derive(Debug, Clone)]
pub enum SortValue {
    Null,
    Bool(bool),
    Int(i128),
    Float(f64),
    Decimal(Decimal),
    Text(String),
    Date(NaiveDate),
    Timestamp(NaiveDateTime),
    Uuid(Uuid),
}

impl SortValue {
    pub fn is_null(&self) -> bool {
        matches!(self, SortValue::Null)
    }

    fn rank(&self) -> u8 {
        match self {
            SortValue::Null => 0,
            SortValue::Bool(_) => 1,
            SortValue::Int(_) | SortValue::Float(_) | SortValue::Decimal(_) => 2,
            SortValue::Text(_) => 3,
            SortValue::Date(_) => 4,
            SortValue::Timestamp(_) => 5,
            SortValue::Uuid(_) => 6,
        }
    }

    fn as_f64(&self) -> Option<f64> {
        match self {
            SortValue::Int(i) => Some(*i as f64),
            SortValue::Float(f) => Some(*f),
            SortValue::Decimal(d) => d.to_f64(),
            _ => None,
        }
    }
}

impl Ord for SortValue {
    fn cmp(&self, other: &Self) -> Ordering {
        use SortValue::*;

        match (self, other) {
            (Null, Null) => Ordering::Equal,
            (Bool(a), Bool(b)) => a.cmp(b),
            (Int(a), Int(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Decimal(a), Decimal(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Timestamp(a), Timestamp(b)) => a.cmp(b),
            (Uuid(a), Uuid(b)) => a.cmp(b),
            _ => match (self.as_f64(), other.as_f64()) {
                // Mixed numeric kinds
                (Some(a), Some(b)) => a.total_cmp(&b),
                _ => self.rank().cmp(&other.rank()),
            },
        }
    }
}

impl PartialOrd for SortValue {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for SortValue {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for SortValue {}

macro_rules! sort_value_from {
    ($variant:ident => $($ty:ty),+) => {
        $(
            impl From<&$ty> for SortValue {
                fn from(value: &$ty) -> Self {
                    SortValue::$variant((*value).into())
                }
            }
        )+
    };
}

sort_value_from!(Int => i8, i16, i32, i64, u8, u16, u32, u64);
sort_value_from!(Float => f32, f64);
sort_value_from!(Bool => bool);

impl From<&i128> for SortValue {
    fn from(value: &i128) -> Self {
        SortValue::Int(*value)
    }
}

impl From<&usize> for SortValue {
    fn from(value: &usize) -> Self {
        SortValue::Int(*value as i128)
    }
}

impl From<&isize> for SortValue {
    fn from(value: &isize) -> Self {
        SortValue::Int(*value as i128)
    }
}

impl From<&Decimal> for SortValue {
    fn from(value: &Decimal) -> Self {
        SortValue::Decimal(*value)
    }
}

impl From<&String> for SortValue {
    fn from(value: &String) -> Self {
        SortValue::Text(value.clone())
    }
}

impl From<&&str> for SortValue {
    fn from(value: &&str) -> Self {
        SortValue::Text((*value).to_string())
    }
}

impl From<&char> for SortValue {
    fn from(value: &char) -> Self {
        SortValue::Text(value.to_string())
    }
}

impl From<&NaiveDate> for SortValue {
    fn from(value: &NaiveDate) -> Self {
        SortValue::Date(*value)
    }
}

impl From<&NaiveDateTime> for SortValue {
    fn from(value: &NaiveDateTime) -> Self {
        SortValue::Timestamp(*value)
    }
}

impl From<&DateTime<Utc>> for SortValue {
    fn from(value: &DateTime<Utc>) -> Self {
        SortValue::Timestamp(value.naive_utc())
    }
}

impl From<&Uuid> for SortValue {
    fn from(value: &Uuid) -> Self {
        SortValue::Uuid(*value)
    }
}

impl<T> From<&Option<T>> for SortValue
where
    for<'a> SortValue: From<&'a T>,
{
    fn from(value: &Option<T>) -> Self {
        match value {
            Some(inner) => SortValue::from(inner),
            None => SortValue::Null,
        }
    }
}

impl<T> From<&Box<T>> for SortValue
where
    for<'a> SortValue: From<&'a T>,
{
    fn from(value: &Box<T>) -> Self {
        SortValue::from(&**value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_null_sorts_first() {
        assert!(SortValue::Null < SortValue::Bool(false));
        assert!(SortValue::Null < SortValue::Int(-5));
        assert!(SortValue::Null < SortValue::Text(String::new()));
    }

    #[test]
    fn test_mixed_numeric_compare() {
        assert!(SortValue::Int(2) < SortValue::Float(2.5));
        assert!(SortValue::Float(3.0) > SortValue::Decimal(Decimal::new(299, 2)));
        assert_eq!(SortValue::Int(7), SortValue::Float(7.0));
    }

    #[test]
    fn test_from_option() {
        let some: Option<u32> = Some(4);
        let none: Option<u32> = None;
        assert_eq!(SortValue::from(&some), SortValue::Int(4));
        assert!(SortValue::from(&none).is_null());
    }

    #[test]
    fn test_kind_rank() {
        assert!(SortValue::Int(1_000) < SortValue::Text("a".into()));
        assert!(SortValue::Bool(true) < SortValue::Int(0));
    }

    #[test]
    fn test_text_natural_order() {
        let mut values = vec![
            SortValue::from(&"charlie".to_string()),
            SortValue::from(&"alice".to_string()),
            SortValue::from(&"bob".to_string()),
        ];
        values.sort();
        assert_eq!(values[0], SortValue::Text("alice".into()));
        assert_eq!(values[2], SortValue::Text("charlie".into()));
    }
}
