//! Values bound as query parameters
//!
//! Everything passed to a where clause is converted into a [`QueryValue`]
//! first and then normalized into the JSON shape the server expects.

use chrono::{DateTime, Timelike, Utc};
use serde_json::{Number, Value};
use std::time::Duration;

/// A value supplied by the caller for a clause, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
    DateTime(DateTime<Utc>),
    /// Sent as a tick count (100ns units)
    Duration(Duration),
    /// Enumerations are sent by name
    Enum(String),
    /// Nested lists are flattened when used as a collection argument
    List(Vec<QueryValue>),
    /// Arbitrary JSON, sent untouched
    Json(Value),
}

impl QueryValue {
    /// An enumeration member, identified by name.
    pub fn enum_member(name: impl Into<String>) -> Self {
        QueryValue::Enum(name.into())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, QueryValue::Null)
    }

    /// Flatten a list of values, unpacking nested lists recursively.
    pub fn flatten<I>(values: I) -> Vec<QueryValue>
    where
        I: IntoIterator<Item = QueryValue>,
    {
        let mut flat = Vec::new();
        for value in values {
            unpack_into(value, &mut flat);
        }
        flat
    }

    /// Normalize into the JSON value stored in the parameter table.
    pub fn to_json(&self) -> Value {
        match self {
            QueryValue::Null => Value::Null,
            QueryValue::Bool(b) => Value::Bool(*b),
            QueryValue::Int(i) => Value::Number((*i).into()),
            QueryValue::Float(f) => Number::from_f64(*f).map(Value::Number).unwrap_or(Value::Null),
            QueryValue::String(s) | QueryValue::Enum(s) => Value::String(s.clone()),
            QueryValue::DateTime(dt) => Value::String(format_date_time(dt)),
            QueryValue::Duration(d) => Value::Number(duration_to_ticks(*d).into()),
            QueryValue::List(items) => Value::Array(items.iter().map(QueryValue::to_json).collect()),
            QueryValue::Json(v) => v.clone(),
        }
    }
}

fn unpack_into(value: QueryValue, flat: &mut Vec<QueryValue>) {
    match value {
        QueryValue::List(items) => {
            for item in items {
                unpack_into(item, flat);
            }
        }
        QueryValue::Json(Value::Array(items)) => {
            for item in items {
                unpack_into(QueryValue::Json(item), flat);
            }
        }
        other => flat.push(other),
    }
}

/// Round-trip date format with seven fractional digits.
pub fn format_date_time(dt: &DateTime<Utc>) -> String {
    format!(
        "{}.{:07}Z",
        dt.format("%Y-%m-%dT%H:%M:%S"),
        dt.nanosecond() % 1_000_000_000 / 100
    )
}

/// Durations are sent as ticks of 100 nanoseconds.
pub fn duration_to_ticks(duration: Duration) -> i64 {
    i64::try_from(duration.as_nanos() / 100).unwrap_or(i64::MAX)
}

macro_rules! from_int {
    ($($t:ty),*) => {
        $(impl From<$t> for QueryValue {
            fn from(value: $t) -> Self {
                QueryValue::Int(i64::from(value))
            }
        })*
    };
}

from_int!(i8, i16, i32, i64, u8, u16, u32);

impl From<usize> for QueryValue {
    fn from(value: usize) -> Self {
        QueryValue::Int(i64::try_from(value).unwrap_or(i64::MAX))
    }
}

impl From<f32> for QueryValue {
    fn from(value: f32) -> Self {
        QueryValue::Float(f64::from(value))
    }
}

impl From<f64> for QueryValue {
    fn from(value: f64) -> Self {
        QueryValue::Float(value)
    }
}

impl From<bool> for QueryValue {
    fn from(value: bool) -> Self {
        QueryValue::Bool(value)
    }
}

impl From<&str> for QueryValue {
    fn from(value: &str) -> Self {
        QueryValue::String(value.to_string())
    }
}

impl From<String> for QueryValue {
    fn from(value: String) -> Self {
        QueryValue::String(value)
    }
}

impl From<DateTime<Utc>> for QueryValue {
    fn from(value: DateTime<Utc>) -> Self {
        QueryValue::DateTime(value)
    }
}

impl From<Duration> for QueryValue {
    fn from(value: Duration) -> Self {
        QueryValue::Duration(value)
    }
}

impl From<Value> for QueryValue {
    fn from(value: Value) -> Self {
        QueryValue::Json(value)
    }
}

impl<T: Into<QueryValue>> From<Option<T>> for QueryValue {
    fn from(value: Option<T>) -> Self {
        value.map_or(QueryValue::Null, Into::into)
    }
}

impl<T: Into<QueryValue>> From<Vec<T>> for QueryValue {
    fn from(values: Vec<T>) -> Self {
        QueryValue::List(values.into_iter().map(Into::into).collect())
    }
}

/// A server-evaluated method call used as the right-hand side of an equality.
///
/// Only compare-exchange lookups are understood by the server.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodCall {
    pub(crate) method: String,
    pub(crate) args: Vec<QueryValue>,
    pub(crate) access_path: Option<String>,
}

/// Method name accepted for compare-exchange lookups
pub const COMPARE_EXCHANGE_METHOD: &str = "CmpXchg";

impl MethodCall {
    pub fn new(method: impl Into<String>, args: Vec<QueryValue>) -> Self {
        Self {
            method: method.into(),
            args,
            access_path: None,
        }
    }

    /// `cmpxchg('key')`
    pub fn compare_exchange(key: impl Into<String>) -> Self {
        Self::new(COMPARE_EXCHANGE_METHOD, vec![QueryValue::String(key.into())])
    }

    /// Read a property of the method result, e.g. `cmpxchg($p0).Owner`
    pub fn with_access_path(mut self, path: impl Into<String>) -> Self {
        self.access_path = Some(path.into());
        self
    }

    pub fn method(&self) -> &str {
        &self.method
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    #[test]
    fn test_flatten_nested_lists() {
        let nested = vec![
            QueryValue::from(1),
            QueryValue::List(vec![QueryValue::from(2), QueryValue::List(vec![QueryValue::from(3)])]),
            QueryValue::Json(json!([4, [5]])),
        ];

        let flat = QueryValue::flatten(nested);
        let rendered: Vec<Value> = flat.iter().map(QueryValue::to_json).collect();
        assert_eq!(rendered, vec![json!(1), json!(2), json!(3), json!(4), json!(5)]);
    }

    #[test]
    fn test_duration_sent_as_ticks() {
        let value = QueryValue::from(Duration::from_millis(1500));
        assert_eq!(value.to_json(), json!(15_000_000));
    }

    #[test]
    fn test_date_time_format() {
        let dt = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 0).unwrap()
            + chrono::Duration::nanoseconds(123_456_700);
        assert_eq!(
            QueryValue::from(dt).to_json(),
            json!("2024-03-09T14:05:00.1234567Z")
        );
    }

    #[test]
    fn test_enum_sent_by_name() {
        assert_eq!(QueryValue::enum_member("Active").to_json(), json!("Active"));
    }

    #[test]
    fn test_option_none_is_null() {
        let none: Option<i32> = None;
        assert!(QueryValue::from(none).is_null());
    }

    #[test]
    fn test_nan_normalizes_to_null() {
        assert_eq!(QueryValue::from(f64::NAN).to_json(), Value::Null);
    }
}
