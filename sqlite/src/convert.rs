//! Conversion between record values and SQLite values, and the row mapper.
//!
//! Going in, dates are lowered to `YYYYMMDD` integers and list fields to
//! JSON array text. Coming out, [`row_to_record`] walks the persisted
//! fields of a record type and decodes each raw column back into the
//! field's semantic type.
//!
//! The row mapper is deliberately permissive: a malformed date keeps its
//! raw value and a malformed list becomes empty. Both cases are logged at
//! `warn` level so bad rows are visible without failing a whole search.

use clinical_records_core::{
    FieldDescriptor, RecordInstance, RecordType, SemanticType, Value, decode_date_int,
    decode_date_str, encode_date,
};
use rusqlite::types::Value as SqlValue;
use tracing::warn;

use crate::error::{Result, SqliteError};

/// Lowers a value to its stored representation.
///
/// Dates become `YYYYMMDD` integers and lists become JSON array text; all
/// other values are returned unchanged.
///
/// # Examples
///
/// ```
/// use chrono::NaiveDate;
/// use clinical_records_core::Value;
/// use clinical_records_sqlite::lower_value;
///
/// let date = Value::Date(NaiveDate::from_ymd_opt(1990, 5, 4).unwrap());
/// assert_eq!(lower_value(&date), Value::Integer(19900504));
///
/// let list = Value::List(vec![serde_json::json!({"dose": "5mg"})]);
/// assert_eq!(lower_value(&list), Value::Text(r#"[{"dose":"5mg"}]"#.into()));
/// ```
pub fn lower_value(value: &Value) -> Value {
    match value {
        Value::Date(date) => Value::Integer(encode_date(*date)),
        Value::List(items) => Value::Text(serde_json::Value::Array(items.clone()).to_string()),
        other => other.clone(),
    }
}

/// Converts a value into a bindable rusqlite value.
pub(crate) fn to_sql_value(value: &Value) -> SqlValue {
    match lower_value(value) {
        Value::Null => SqlValue::Null,
        Value::Integer(i) => SqlValue::Integer(i),
        Value::Real(r) => SqlValue::Real(r),
        Value::Text(s) => SqlValue::Text(s),
        Value::Blob(b) => SqlValue::Blob(b),
        // lower_value never returns these
        Value::Date(date) => SqlValue::Integer(encode_date(date)),
        Value::List(items) => SqlValue::Text(serde_json::Value::Array(items).to_string()),
    }
}

/// Converts a raw column value read from SQLite.
pub(crate) fn from_sql_value(value: SqlValue) -> Value {
    match value {
        SqlValue::Null => Value::Null,
        SqlValue::Integer(i) => Value::Integer(i),
        SqlValue::Real(r) => Value::Real(r),
        SqlValue::Text(s) => Value::Text(s),
        SqlValue::Blob(b) => Value::Blob(b),
    }
}

/// Reads every column of a result row, in column order.
pub(crate) fn read_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Vec<Value>> {
    let count = row.as_ref().column_count();
    (0..count)
        .map(|idx| row.get::<_, SqlValue>(idx).map(from_sql_value))
        .collect()
}

/// Builds a record instance from a raw result row.
///
/// `raw` must hold one value per persisted field, in declaration order
/// (the column order of `SELECT *` on a generated table). Ignored fields
/// receive their [default value](FieldDescriptor::default_value).
///
/// # Errors
///
/// Returns [`SqliteError::RowArity`] if the row width differs from the
/// record type's column count.
///
/// # Examples
///
/// ```
/// use clinical_records_core::{FieldDescriptor, RecordType, Value};
/// use clinical_records_sqlite::row_to_record;
///
/// static VISIT: RecordType = RecordType {
///     name: "Visit",
///     fields: &[
///         FieldDescriptor::integer("id").primary_key().autoincrement(),
///         FieldDescriptor::optional_date("seen"),
///     ],
/// };
///
/// let visit = row_to_record(&VISIT, vec![Value::Integer(1), Value::Integer(20240229)]).unwrap();
/// assert!(matches!(visit.get("seen"), Some(Value::Date(_))));
/// ```
pub fn row_to_record(record_type: &'static RecordType, raw: Vec<Value>) -> Result<RecordInstance> {
    let expected = record_type.column_count();
    if raw.len() != expected {
        return Err(SqliteError::RowArity {
            table: record_type.name,
            expected,
            found: raw.len(),
        });
    }

    let mut columns = raw.into_iter();
    let values = record_type
        .fields
        .iter()
        .map(|field| {
            if field.is_persisted() {
                decode_column(record_type, field, columns.next().unwrap_or(Value::Null))
            } else {
                field.default_value()
            }
        })
        .collect();

    Ok(RecordInstance::new(record_type, values)?)
}

fn decode_column(record_type: &RecordType, field: &FieldDescriptor, raw: Value) -> Value {
    match field.semantic_type.base() {
        SemanticType::Date => decode_date_column(record_type, field, raw),
        SemanticType::List(_) => decode_list_column(record_type, field, raw),
        _ => raw,
    }
}

fn decode_date_column(record_type: &RecordType, field: &FieldDescriptor, raw: Value) -> Value {
    let parsed = match &raw {
        Value::Null | Value::Date(_) => return raw,
        Value::Integer(i) => decode_date_int(*i),
        Value::Text(s) => decode_date_str(s),
        _ => None,
    };
    match parsed {
        Some(date) => Value::Date(date),
        None => {
            warn!(
                table = record_type.name,
                field = field.name,
                value = ?raw,
                "Unparseable date, keeping raw value"
            );
            raw
        }
    }
}

fn decode_list_column(record_type: &RecordType, field: &FieldDescriptor, raw: Value) -> Value {
    match raw {
        Value::Null => Value::List(Vec::new()),
        Value::List(items) => Value::List(items),
        Value::Text(text) => match serde_json::from_str::<Vec<serde_json::Value>>(&text) {
            Ok(items) => Value::List(items),
            Err(err) => {
                warn!(
                    table = record_type.name,
                    field = field.name,
                    error = %err,
                    "Malformed list JSON, using empty list"
                );
                Value::List(Vec::new())
            }
        },
        other => {
            warn!(
                table = record_type.name,
                field = field.name,
                kind = other.kind(),
                "List column holds a non-text value, using empty list"
            );
            Value::List(Vec::new())
        }
    }
}
