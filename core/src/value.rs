//! Field values and conversions between Rust types and [`Value`].
//!
//! [`Value`] is the dynamic representation used by statement builders and the
//! row mapper. Typed records convert their fields through [`ToValue`] and
//! [`FromValue`], which the [`record!`](crate::record!) macro calls for every
//! declared field.

use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use serde::de::DeserializeOwned;
use thiserror::Error;
use tracing::warn;

/// A single field value.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
    Date(NaiveDate),
    /// Elements of a list field, one JSON object per nested record.
    List(Vec<serde_json::Value>),
    Blob(Vec<u8>),
}

impl Value {
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Short name of the variant, used in conversion errors.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Integer(_) => "integer",
            Value::Real(_) => "real",
            Value::Text(_) => "text",
            Value::Date(_) => "date",
            Value::List(_) => "list",
            Value::Blob(_) => "blob",
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Real(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::Text(value)
    }
}

impl From<NaiveDate> for Value {
    fn from(value: NaiveDate) -> Self {
        Value::Date(value)
    }
}

/// Encodes a date as the compact `YYYYMMDD` integer stored in date columns.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use clinical_records_core::encode_date;
///
/// let date = NaiveDate::from_ymd_opt(2025, 6, 1).unwrap();
/// assert_eq!(encode_date(date), 20250601);
/// ```
pub fn encode_date(date: NaiveDate) -> i64 {
    i64::from(date.year()) * 10_000 + i64::from(date.month()) * 100 + i64::from(date.day())
}

/// Decodes a `YYYYMMDD` integer. Returns `None` for anything that is not an
/// eight-digit valid calendar date.
pub fn decode_date_int(encoded: i64) -> Option<NaiveDate> {
    if !(10_000_000..=99_999_999).contains(&encoded) {
        return None;
    }
    let year = i32::try_from(encoded / 10_000).ok()?;
    let month = u32::try_from(encoded / 100 % 100).ok()?;
    let day = u32::try_from(encoded % 100).ok()?;
    NaiveDate::from_ymd_opt(year, month, day)
}

/// Decodes a date stored as text.
///
/// Accepts the eight-digit `YYYYMMDD` form and the `YYYY-MM-DD` form
/// written by older databases that stored dates as `TEXT`.
///
/// # Examples
///
/// ```
/// use clinical_records_core::decode_date_str;
///
/// assert!(decode_date_str("20250601").is_some());
/// assert!(decode_date_str("2025-06-01").is_some());
/// assert!(decode_date_str("2025061").is_none());
/// assert!(decode_date_str("20251301").is_none());
/// ```
pub fn decode_date_str(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    if text.len() == 8 && text.bytes().all(|b| b.is_ascii_digit()) {
        return decode_date_int(text.parse().ok()?);
    }
    NaiveDate::parse_from_str(text, "%Y-%m-%d").ok()
}

/// A value could not be converted into the declared Rust type.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("expected {expected}, found {found}")]
pub struct ConversionError {
    pub expected: &'static str,
    pub found: String,
}

impl ConversionError {
    fn new(expected: &'static str, value: &Value) -> Self {
        Self {
            expected,
            found: value.kind().to_string(),
        }
    }
}

/// Converts a Rust field into a [`Value`].
pub trait ToValue {
    fn to_value(&self) -> Value;
}

/// Builds a Rust field from a [`Value`].
pub trait FromValue: Sized {
    fn from_value(value: Value) -> Result<Self, ConversionError>;
}

impl ToValue for i64 {
    fn to_value(&self) -> Value {
        Value::Integer(*self)
    }
}

impl FromValue for i64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Integer(i) => Ok(i),
            other => Err(ConversionError::new("integer", &other)),
        }
    }
}

impl ToValue for f64 {
    fn to_value(&self) -> Value {
        Value::Real(*self)
    }
}

impl FromValue for f64 {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Real(r) => Ok(r),
            // REAL columns hand back whole numbers as integers
            Value::Integer(i) => Ok(i as f64),
            other => Err(ConversionError::new("real", &other)),
        }
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::Text(self.clone())
    }
}

impl FromValue for String {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Text(s) => Ok(s),
            other => Err(ConversionError::new("text", &other)),
        }
    }
}

impl ToValue for NaiveDate {
    fn to_value(&self) -> Value {
        Value::Date(*self)
    }
}

impl FromValue for NaiveDate {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Date(d) => Ok(d),
            other => Err(ConversionError::new("date", &other)),
        }
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        match self {
            Some(inner) => inner.to_value(),
            None => Value::Null,
        }
    }
}

impl<T: FromValue> FromValue for Option<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(None),
            other => T::from_value(other).map(Some),
        }
    }
}

impl<T: Serialize> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        Value::List(
            self.iter()
                .map(|item| {
                    serde_json::to_value(item).unwrap_or_else(|err| {
                        warn!(error = %err, "List element does not serialize; storing null");
                        serde_json::Value::Null
                    })
                })
                .collect(),
        )
    }
}

impl<T: DeserializeOwned> FromValue for Vec<T> {
    fn from_value(value: Value) -> Result<Self, ConversionError> {
        match value {
            Value::Null => Ok(Vec::new()),
            Value::List(items) => items
                .into_iter()
                .map(|item| {
                    serde_json::from_value(item).map_err(|err| ConversionError {
                        expected: "list element",
                        found: err.to_string(),
                    })
                })
                .collect(),
            other => Err(ConversionError::new("list", &other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, PartialEq, Serialize, Deserialize)]
    struct Item {
        name: String,
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_date_codec() {
        assert_eq!(encode_date(date(1990, 12, 31)), 19901231);
        assert_eq!(decode_date_int(19901231), Some(date(1990, 12, 31)));
        assert_eq!(decode_date_int(19900230), None);
        assert_eq!(decode_date_int(1990123), None);
        assert_eq!(decode_date_int(-20250101), None);
    }

    #[test]
    fn test_decode_date_str_forms() {
        assert_eq!(decode_date_str(" 20250601 "), Some(date(2025, 6, 1)));
        assert_eq!(decode_date_str("2025-06-01"), Some(date(2025, 6, 1)));
        assert_eq!(decode_date_str("01/06/2025"), None);
        assert_eq!(decode_date_str(""), None);
    }

    #[test]
    fn test_option_round_trip() {
        assert_eq!(None::<i64>.to_value(), Value::Null);
        assert_eq!(Option::<String>::from_value(Value::Null), Ok(None));
        assert_eq!(
            Option::<String>::from_value(Value::Text("x".into())),
            Ok(Some("x".to_string()))
        );
    }

    #[test]
    fn test_real_accepts_integer() {
        assert_eq!(f64::from_value(Value::Integer(72)), Ok(72.0));
    }

    #[test]
    fn test_wrong_kind_is_reported() {
        let err = i64::from_value(Value::Text("12".into())).unwrap_err();
        assert_eq!(err.expected, "integer");
        assert_eq!(err.found, "text");
        assert_eq!(err.to_string(), "expected integer, found text");
    }

    #[test]
    fn test_list_conversion() {
        let items = vec![Item { name: "a".into() }, Item { name: "b".into() }];
        let value = items.to_value();
        assert_eq!(
            value,
            Value::List(vec![
                serde_json::json!({"name": "a"}),
                serde_json::json!({"name": "b"})
            ])
        );
        assert_eq!(Vec::<Item>::from_value(value), Ok(items));
        assert_eq!(Vec::<Item>::from_value(Value::Null), Ok(Vec::new()));
    }

    struct Unserializable;

    impl Serialize for Unserializable {
        fn serialize<S: serde::Serializer>(&self, _serializer: S) -> Result<S::Ok, S::Error> {
            Err(serde::ser::Error::custom("no JSON form"))
        }
    }

    #[test]
    fn test_unserializable_element_becomes_null() {
        let value = vec![Unserializable, Unserializable].to_value();
        assert_eq!(
            value,
            Value::List(vec![serde_json::Value::Null, serde_json::Value::Null])
        );
    }

    #[test]
    fn test_list_element_mismatch() {
        let value = Value::List(vec![serde_json::json!(42)]);
        let err = Vec::<Item>::from_value(value).unwrap_err();
        assert_eq!(err.expected, "list element");
    }
}
