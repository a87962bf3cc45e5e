//! Parameterized CRUD statements built from record instances.
//!
//! Every builder returns a [`Statement`]: SQL text with `?` placeholders
//! plus the values to bind, already lowered to their stored form. Values
//! never appear in the SQL text itself, so names such as `O'Brien` or
//! strings shaped like SQL are stored verbatim.
//!
//! Filters follow the search-by-example convention: a field takes part in
//! a `WHERE` clause only when it holds a non-null value.

use std::fmt;

use clinical_records_core::{RecordInstance, Value, encode_date};

use crate::convert::lower_value;
use crate::error::{Result, SqliteError};
use crate::schema::quote_identifier;

/// SQL text and its positional parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    sql: String,
    params: Vec<Value>,
}

impl Statement {
    pub fn new(sql: impl Into<String>, params: Vec<Value>) -> Self {
        Self {
            sql: sql.into(),
            params,
        }
    }

    /// SQL text with `?` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values bound to the placeholders, in order.
    pub fn params(&self) -> &[Value] {
        &self.params
    }

    /// Renders the statement with its parameters inlined as SQL literals.
    ///
    /// Strings are single-quoted with embedded quotes doubled, dates are
    /// bare `YYYYMMDD` integers, nulls are `NULL` and lists are quoted JSON.
    /// The result is meant for logs and inspection; execution always binds.
    ///
    /// # Examples
    ///
    /// ```
    /// use clinical_records_core::Value;
    /// use clinical_records_sqlite::Statement;
    ///
    /// let stmt = Statement::new(
    ///     r#"SELECT * FROM "Patient" WHERE "name" = ? AND "age" = ?;"#,
    ///     vec![Value::Text("Juan O'Brien".into()), Value::Integer(40)],
    /// );
    /// assert_eq!(
    ///     stmt.to_inline_sql(),
    ///     r#"SELECT * FROM "Patient" WHERE "name" = 'Juan O''Brien' AND "age" = 40;"#
    /// );
    /// ```
    pub fn to_inline_sql(&self) -> String {
        let mut out = String::with_capacity(self.sql.len());
        let mut params = self.params.iter();
        let mut quote: Option<char> = None;

        for ch in self.sql.chars() {
            match (ch, quote) {
                ('?', None) => match params.next() {
                    Some(value) => out.push_str(&sql_literal(value)),
                    None => out.push('?'),
                },
                ('"' | '\'', None) => {
                    quote = Some(ch);
                    out.push(ch);
                }
                (c, Some(open)) if c == open => {
                    quote = None;
                    out.push(ch);
                }
                _ => out.push(ch),
            }
        }
        out
    }
}

impl fmt::Display for Statement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sql)
    }
}

/// Renders a value as a SQL literal.
pub fn sql_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Integer(i) => i.to_string(),
        Value::Real(r) => r.to_string(),
        Value::Text(s) => quote_text(s),
        Value::Date(date) => encode_date(*date).to_string(),
        Value::List(_) => match lower_value(value) {
            Value::Text(json) => quote_text(&json),
            other => sql_literal(&other),
        },
        Value::Blob(bytes) => {
            let hex: String = bytes.iter().map(|b| format!("{b:02X}")).collect();
            format!("X'{hex}'")
        }
    }
}

fn quote_text(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

/// How an insert treats an existing row with the same key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InsertMode {
    /// Plain `INSERT`; key conflicts fail.
    #[default]
    Insert,
    /// `INSERT OR REPLACE`; an engine-assigned key holding a positive id is
    /// written so the existing row is replaced.
    Replace,
}

/// Comparison operator applied to every select filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Comparator {
    #[default]
    Equal,
    /// SQL `Like`; callers supply the `%` wildcards.
    Like,
}

impl Comparator {
    pub fn as_sql(self) -> &'static str {
        match self {
            Comparator::Equal => "=",
            Comparator::Like => "Like",
        }
    }
}

/// Options for [`select_statement`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SelectOptions {
    pub comparator: Comparator,
    /// Leave integer key fields out of the filter, so a template's id does
    /// not narrow a search.
    pub ignore_primary_int: bool,
    pub limit: Option<i64>,
    pub offset: Option<i64>,
}

impl SelectOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn comparator(mut self, comparator: Comparator) -> Self {
        self.comparator = comparator;
        self
    }

    pub fn ignore_primary_int(mut self, ignore: bool) -> Self {
        self.ignore_primary_int = ignore;
        self
    }

    pub fn limit(mut self, limit: i64) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn offset(mut self, offset: i64) -> Self {
        self.offset = Some(offset);
        self
    }
}

/// Builds an `INSERT` for every persisted field of `instance`.
///
/// An engine-assigned key (a persisted `AUTOINCREMENT` integer) is left out
/// so SQLite allocates it. In [`InsertMode::Replace`] it is kept when it
/// holds a positive integer. A record with no remaining columns inserts
/// `DEFAULT VALUES`.
///
/// # Examples
///
/// ```
/// use clinical_records_core::{FieldDescriptor, RecordInstance, RecordType, Value};
/// use clinical_records_sqlite::{InsertMode, insert_statement};
///
/// static PATIENT: RecordType = RecordType {
///     name: "Patient",
///     fields: &[
///         FieldDescriptor::integer("id").primary_key().autoincrement().unique(),
///         FieldDescriptor::text("name"),
///     ],
/// };
///
/// let mut patient = RecordInstance::with_defaults(&PATIENT);
/// patient.set("name", "Juan O'Brien").unwrap();
///
/// let stmt = insert_statement(&patient, InsertMode::Insert);
/// assert_eq!(stmt.sql(), r#"INSERT INTO "Patient" ("name") VALUES (?);"#);
/// assert_eq!(stmt.params(), &[Value::Text("Juan O'Brien".into())]);
/// assert_eq!(
///     stmt.to_inline_sql(),
///     r#"INSERT INTO "Patient" ("name") VALUES ('Juan O''Brien');"#
/// );
/// ```
pub fn insert_statement(instance: &RecordInstance, mode: InsertMode) -> Statement {
    let table = quote_identifier(instance.record_type().name);
    let verb = match mode {
        InsertMode::Insert => "INSERT",
        InsertMode::Replace => "INSERT OR REPLACE",
    };

    let mut columns = Vec::new();
    let mut params = Vec::new();
    for (field, value) in instance.persisted() {
        if field.is_engine_assigned() {
            let keep = mode == InsertMode::Replace && matches!(value, Value::Integer(id) if *id > 0);
            if !keep {
                continue;
            }
        }
        columns.push(quote_identifier(field.name));
        params.push(lower_value(value));
    }

    if columns.is_empty() {
        return Statement::new(format!("{verb} INTO {table} DEFAULT VALUES;"), params);
    }

    let placeholders = vec!["?"; columns.len()].join(", ");
    Statement::new(
        format!(
            "{verb} INTO {table} ({}) VALUES ({placeholders});",
            columns.join(", ")
        ),
        params,
    )
}

/// Builds an `UPDATE` that rewrites the row matching `old` with the values
/// of `new`.
///
/// `SET` covers the persisted fields of `new` except engine-assigned keys.
/// `WHERE` matches every persisted field of `old`; null values match with
/// `IS NULL`.
///
/// # Errors
///
/// - [`SqliteError::TypeMismatch`] if `old` and `new` belong to different
///   record types.
/// - [`SqliteError::EmptyFilter`] if there is nothing to set or nothing to
///   match on.
pub fn update_statement(old: &RecordInstance, new: &RecordInstance) -> Result<Statement> {
    let record_type = old.record_type();
    if record_type.name != new.record_type().name {
        return Err(SqliteError::TypeMismatch {
            old: record_type.name,
            new: new.record_type().name,
        });
    }

    let mut params = Vec::new();

    let assignments: Vec<String> = new
        .persisted()
        .filter(|(field, _)| !field.is_engine_assigned())
        .map(|(field, value)| {
            params.push(lower_value(value));
            format!("{} = ?", quote_identifier(field.name))
        })
        .collect();

    let conditions: Vec<String> = old
        .persisted()
        .map(|(field, value)| {
            let column = quote_identifier(field.name);
            match value {
                Value::Null => format!("{column} IS NULL"),
                // the row mapper reads NULL list columns as []
                Value::List(items) if items.is_empty() => {
                    params.push(lower_value(value));
                    format!("({column} = ? OR {column} IS NULL)")
                }
                // the row mapper also accepts dates stored as YYYY-MM-DD text
                Value::Date(date) => {
                    params.push(lower_value(value));
                    params.push(Value::Text(date.format("%Y-%m-%d").to_string()));
                    format!("({column} = ? OR {column} = ?)")
                }
                _ => {
                    params.push(lower_value(value));
                    format!("{column} = ?")
                }
            }
        })
        .collect();

    if assignments.is_empty() || conditions.is_empty() {
        return Err(SqliteError::EmptyFilter {
            operation: "update",
            table: record_type.name,
        });
    }

    Ok(Statement::new(
        format!(
            "UPDATE {} SET {} WHERE {};",
            quote_identifier(record_type.name),
            assignments.join(", "),
            conditions.join(" AND ")
        ),
        params,
    ))
}

/// Builds a `DELETE` for the row identified by `instance`.
///
/// Record types with a declared key filter on the whole key, and every key
/// field must hold a value. Keyless record types filter on every non-null
/// persisted field.
///
/// # Errors
///
/// Returns [`SqliteError::EmptyFilter`] when a key field is null or no
/// usable filter remains, so a partial instance can never delete more than
/// the row it names.
pub fn delete_statement(instance: &RecordInstance) -> Result<Statement> {
    let record_type = instance.record_type();
    let keyed = record_type.has_primary_key();

    let mut key_incomplete = false;
    let (conditions, params): (Vec<String>, Vec<Value>) = instance
        .persisted()
        .filter(|(field, value)| {
            if keyed {
                key_incomplete |= field.is_primary_key() && value.is_null();
                field.is_primary_key()
            } else {
                !value.is_null()
            }
        })
        .map(|(field, value)| (format!("{} = ?", quote_identifier(field.name)), lower_value(value)))
        .unzip();

    if key_incomplete || conditions.is_empty() {
        return Err(SqliteError::EmptyFilter {
            operation: "delete",
            table: record_type.name,
        });
    }

    Ok(Statement::new(
        format!(
            "DELETE FROM {} WHERE {};",
            quote_identifier(record_type.name),
            conditions.join(" AND ")
        ),
        params,
    ))
}

/// Builds a search-by-example `SELECT *` from a template instance.
///
/// Only non-null persisted fields filter, all with the same comparator. A
/// template with every field null selects the whole table.
///
/// # Examples
///
/// ```
/// use clinical_records_core::{FieldDescriptor, RecordInstance, RecordType, Value};
/// use clinical_records_sqlite::{Comparator, SelectOptions, select_statement};
///
/// static PATIENT: RecordType = RecordType {
///     name: "Patient",
///     fields: &[
///         FieldDescriptor::integer("id").primary_key().autoincrement().unique(),
///         FieldDescriptor::optional_text("name"),
///     ],
/// };
///
/// let mut template = RecordInstance::blank(&PATIENT);
/// template.set("id", 0i64).unwrap();
/// template.set("name", "Juan").unwrap();
///
/// let options = SelectOptions::new()
///     .comparator(Comparator::Like)
///     .ignore_primary_int(true);
/// let stmt = select_statement(&template, &options);
/// assert_eq!(stmt.sql(), r#"SELECT * FROM "Patient" WHERE "name" Like ?;"#);
/// assert_eq!(stmt.params(), &[Value::Text("Juan".into())]);
/// ```
pub fn select_statement(template: &RecordInstance, options: &SelectOptions) -> Statement {
    let operator = options.comparator.as_sql();

    let (conditions, mut params): (Vec<String>, Vec<Value>) = template
        .persisted()
        .filter(|(field, value)| {
            !value.is_null() && !(options.ignore_primary_int && field.is_integer_primary_key())
        })
        .map(|(field, value)| {
            (
                format!("{} {operator} ?", quote_identifier(field.name)),
                lower_value(value),
            )
        })
        .unzip();

    let mut sql = format!(
        "SELECT * FROM {}",
        quote_identifier(template.record_type().name)
    );
    if !conditions.is_empty() {
        sql.push_str(" WHERE ");
        sql.push_str(&conditions.join(" AND "));
    }
    if options.limit.is_some() || options.offset.is_some() {
        // SQLite needs a LIMIT before OFFSET; -1 means no limit
        sql.push_str(" LIMIT ?");
        params.push(Value::Integer(options.limit.unwrap_or(-1)));
        if let Some(offset) = options.offset {
            sql.push_str(" OFFSET ?");
            params.push(Value::Integer(offset));
        }
    }
    sql.push(';');

    Statement::new(sql, params)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use clinical_records_core::{FieldDescriptor, RecordType};
    use serde_json::json;

    static PATIENT: RecordType = RecordType {
        name: "Patient",
        fields: &[
            FieldDescriptor::integer("id").primary_key().autoincrement().unique(),
            FieldDescriptor::separator("lb_g"),
            FieldDescriptor::optional_text("name"),
            FieldDescriptor::optional_date("born"),
            FieldDescriptor::list("visits", &VISIT),
        ],
    };

    static VISIT: RecordType = RecordType {
        name: "Visit",
        fields: &[FieldDescriptor::optional_text("reason")],
    };

    static PAIR: RecordType = RecordType {
        name: "Pair",
        fields: &[
            FieldDescriptor::integer("a").primary_key(),
            FieldDescriptor::optional_text("b").primary_key(),
            FieldDescriptor::optional_text("note"),
        ],
    };

    fn patient(id: i64, name: &str) -> RecordInstance {
        let mut p = RecordInstance::with_defaults(&PATIENT);
        p.set("id", id).unwrap();
        p.set("name", name).unwrap();
        p
    }

    #[test]
    fn test_insert_skips_engine_assigned_and_ignored() {
        let mut p = patient(0, "Ana");
        p.set("born", NaiveDate::from_ymd_opt(1990, 1, 15).unwrap())
            .unwrap();
        p.set("visits", Value::List(vec![json!({"reason": "flu"})]))
            .unwrap();

        let stmt = insert_statement(&p, InsertMode::Insert);
        assert_eq!(
            stmt.sql(),
            r#"INSERT INTO "Patient" ("name", "born", "visits") VALUES (?, ?, ?);"#
        );
        assert_eq!(
            stmt.params(),
            &[
                Value::Text("Ana".into()),
                Value::Integer(19900115),
                Value::Text(r#"[{"reason":"flu"}]"#.into()),
            ]
        );
        assert_eq!(
            stmt.to_inline_sql(),
            r#"INSERT INTO "Patient" ("name", "born", "visits") VALUES ('Ana', 19900115, '[{"reason":"flu"}]');"#
        );
    }

    #[test]
    fn test_replace_keeps_positive_id() {
        let stmt = insert_statement(&patient(12, "Ana"), InsertMode::Replace);
        assert!(stmt.sql().starts_with(r#"INSERT OR REPLACE INTO "Patient" ("id", "name""#));
        assert_eq!(stmt.params()[0], Value::Integer(12));

        let stmt = insert_statement(&patient(0, "Ana"), InsertMode::Replace);
        assert!(!stmt.sql().contains(r#""id""#));
    }

    #[test]
    fn test_insert_with_no_columns_uses_default_values() {
        static COUNTER: RecordType = RecordType {
            name: "Counter",
            fields: &[FieldDescriptor::integer("id").primary_key().autoincrement()],
        };
        let stmt = insert_statement(&RecordInstance::blank(&COUNTER), InsertMode::Insert);
        assert_eq!(stmt.sql(), r#"INSERT INTO "Counter" DEFAULT VALUES;"#);
        assert!(stmt.params().is_empty());
    }

    #[test]
    fn test_update_sets_new_and_matches_old() {
        let mut old = patient(3, "Ana");
        old.set("visits", Value::Null).unwrap();
        let new = patient(3, "Ana Maria");

        let stmt = update_statement(&old, &new).unwrap();
        assert_eq!(
            stmt.sql(),
            r#"UPDATE "Patient" SET "name" = ?, "born" = ?, "visits" = ? WHERE "id" = ? AND "name" = ? AND "born" IS NULL AND "visits" IS NULL;"#
        );
        assert_eq!(
            stmt.params(),
            &[
                Value::Text("Ana Maria".into()),
                Value::Null,
                Value::Text("[]".into()),
                Value::Integer(3),
                Value::Text("Ana".into()),
            ]
        );
    }

    #[test]
    fn test_update_matches_every_stored_form_of_decoded_values() {
        let mut old = patient(4, "Ana");
        old.set("born", NaiveDate::from_ymd_opt(1970, 5, 6).unwrap())
            .unwrap();
        let new = patient(4, "Ana Maria");

        let stmt = update_statement(&old, &new).unwrap();
        assert!(stmt.sql().ends_with(
            r#"WHERE "id" = ? AND "name" = ? AND ("born" = ? OR "born" = ?) AND ("visits" = ? OR "visits" IS NULL);"#
        ));
        assert_eq!(
            &stmt.params()[3..],
            &[
                Value::Integer(4),
                Value::Text("Ana".into()),
                Value::Integer(19700506),
                Value::Text("1970-05-06".into()),
                Value::Text("[]".into()),
            ]
        );
    }

    #[test]
    fn test_update_rejects_different_record_types() {
        let err = update_statement(&patient(1, "Ana"), &RecordInstance::blank(&PAIR)).unwrap_err();
        assert!(matches!(
            err,
            SqliteError::TypeMismatch {
                old: "Patient",
                new: "Pair"
            }
        ));
    }

    #[test]
    fn test_delete_by_primary_key() {
        let stmt = delete_statement(&patient(9, "Ana")).unwrap();
        assert_eq!(stmt.sql(), r#"DELETE FROM "Patient" WHERE "id" = ?;"#);
        assert_eq!(stmt.params(), &[Value::Integer(9)]);
    }

    #[test]
    fn test_delete_refuses_partial_composite_key() {
        let mut pair = RecordInstance::blank(&PAIR);
        pair.set("a", 1i64).unwrap();
        pair.set("note", "x").unwrap();
        let err = delete_statement(&pair).unwrap_err();
        assert!(matches!(
            err,
            SqliteError::EmptyFilter {
                operation: "delete",
                table: "Pair"
            }
        ));
    }

    #[test]
    fn test_delete_full_composite_key() {
        let mut pair = RecordInstance::blank(&PAIR);
        pair.set("a", 1i64).unwrap();
        pair.set("b", "x").unwrap();
        pair.set("note", "ignored by the filter").unwrap();
        let stmt = delete_statement(&pair).unwrap();
        assert_eq!(stmt.sql(), r#"DELETE FROM "Pair" WHERE "a" = ? AND "b" = ?;"#);
        assert_eq!(stmt.params(), &[Value::Integer(1), Value::Text("x".into())]);
    }

    #[test]
    fn test_delete_refuses_empty_filter() {
        let err = delete_statement(&RecordInstance::blank(&PATIENT)).unwrap_err();
        assert!(matches!(
            err,
            SqliteError::EmptyFilter {
                operation: "delete",
                table: "Patient"
            }
        ));
    }

    #[test]
    fn test_select_filters_only_non_null_fields() {
        let mut template = RecordInstance::blank(&PATIENT);
        template.set("born", NaiveDate::from_ymd_opt(2001, 2, 3).unwrap())
            .unwrap();
        let stmt = select_statement(&template, &SelectOptions::new());
        assert_eq!(stmt.sql(), r#"SELECT * FROM "Patient" WHERE "born" = ?;"#);
        assert_eq!(stmt.params(), &[Value::Integer(20010203)]);
    }

    #[test]
    fn test_select_blank_template_selects_everything() {
        let stmt = select_statement(&RecordInstance::blank(&PATIENT), &SelectOptions::new());
        assert_eq!(stmt.sql(), r#"SELECT * FROM "Patient";"#);
    }

    #[test]
    fn test_select_ignore_primary_int() {
        let template = patient(5, "%An%");
        let options = SelectOptions::new().ignore_primary_int(true);
        let stmt = select_statement(&template, &options);
        assert!(!stmt.sql().contains(r#""id""#));

        let stmt = select_statement(&template, &SelectOptions::new());
        assert!(stmt.sql().contains(r#""id" = ?"#));
    }

    #[test]
    fn test_select_pagination() {
        let blank = RecordInstance::blank(&PATIENT);
        let stmt = select_statement(&blank, &SelectOptions::new().limit(10).offset(20));
        assert_eq!(stmt.sql(), r#"SELECT * FROM "Patient" LIMIT ? OFFSET ?;"#);
        assert_eq!(stmt.params(), &[Value::Integer(10), Value::Integer(20)]);

        let stmt = select_statement(&blank, &SelectOptions::new().offset(5));
        assert_eq!(stmt.params(), &[Value::Integer(-1), Value::Integer(5)]);
    }

    #[test]
    fn test_inline_sql_skips_quoted_question_marks() {
        let stmt = Statement::new(
            r#"SELECT * FROM "odd?" WHERE "a" = ? AND b = 'x?';"#,
            vec![Value::Null],
        );
        assert_eq!(
            stmt.to_inline_sql(),
            r#"SELECT * FROM "odd?" WHERE "a" = NULL AND b = 'x?';"#
        );
    }

    #[test]
    fn test_sql_literals() {
        assert_eq!(sql_literal(&Value::Real(1.5)), "1.5");
        assert_eq!(sql_literal(&Value::Blob(vec![0xAB, 0x01])), "X'AB01'");
        assert_eq!(
            sql_literal(&Value::List(vec![json!({"n": "it's"})])),
            r#"'[{"n":"it''s"}]'"#
        );
    }
}
