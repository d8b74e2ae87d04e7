//! Value conversion from SeaQuery to may_postgres parameters.
//!
//! Statements built by the SQL repository carry their bind values as
//! `sea_query::Values`. They are converted into owned `ToSql` boxes first,
//! and the borrowed parameter slice handed to the executor is built from
//! those boxes, so every reference stays valid for the closure's scope.

use crate::error::SearchError;
use may_postgres::types::ToSql;
use sea_query::Value;

/// Convert one SeaQuery value into an owned parameter.
fn to_param(value: &Value) -> Result<Box<dyn ToSql>, SearchError> {
    let param: Box<dyn ToSql> = match value {
        Value::Bool(v) => Box::new(*v),
        Value::TinyInt(v) => Box::new(v.map(i16::from)),
        Value::SmallInt(v) => Box::new(*v),
        Value::Int(v) => Box::new(*v),
        Value::BigInt(v) => Box::new(*v),
        Value::TinyUnsigned(v) => Box::new(v.map(i16::from)),
        Value::SmallUnsigned(v) => Box::new(v.map(i32::from)),
        Value::Unsigned(v) => Box::new(v.map(i64::from)),
        Value::BigUnsigned(v) => match v {
            Some(u) => Box::new(Some(i64::try_from(*u).map_err(|_| {
                SearchError::Store(format!(
                    "BigUnsigned value {} exceeds i64::MAX ({}), cannot be safely cast to i64",
                    u,
                    i64::MAX
                ))
            })?)),
            None => Box::new(None::<i64>),
        },
        Value::Float(v) => Box::new(*v),
        Value::Double(v) => Box::new(*v),
        Value::String(v) => Box::new(v.as_ref().map(|s| s.to_string())),
        Value::Bytes(v) => Box::new(v.as_ref().map(|b| b.to_vec())),
        Value::Json(v) => Box::new(v.as_ref().map(|j| serde_json::Value::clone(j))),
        Value::ChronoDateTimeUtc(v) => Box::new(v.as_ref().map(|d| chrono::DateTime::<chrono::Utc>::clone(d))),
        Value::ChronoDateTime(v) => Box::new(v.as_ref().map(|d| chrono::NaiveDateTime::clone(d))),
        Value::ChronoDate(v) => Box::new(v.as_ref().map(|d| chrono::NaiveDate::clone(d))),
        Value::Uuid(v) => Box::new(v.as_ref().map(|u| uuid::Uuid::clone(u))),
        Value::Decimal(v) => Box::new(v.as_ref().map(|d| rust_decimal::Decimal::clone(d))),
        _ => {
            return Err(SearchError::Store(format!(
                "Unsupported value type in query: {:?}",
                value
            )));
        }
    };
    Ok(param)
}

/// Convert SeaQuery values to may_postgres parameters and run `f` with them.
///
/// # Errors
///
/// Returns `SearchError::Store` if an unsupported value type is encountered,
/// otherwise whatever `f` returns.
pub fn with_converted_params<F, R>(values: &sea_query::Values, f: F) -> Result<R, SearchError>
where
    F: FnOnce(&[&dyn ToSql]) -> Result<R, SearchError>,
{
    let owned = values.iter().map(to_param).collect::<Result<Vec<_>, _>>()?;
    let params: Vec<&dyn ToSql> = owned.iter().map(|param| &**param).collect();
    f(&params)
}
