//! `CREATE TABLE` generation from record types.
//!
//! Each persisted field becomes a quoted column with its storage class and
//! `UNIQUE` / `NOT NULL` suffixes. The key clause depends on the declared
//! constraints:
//!
//! - no key and no `AUTOINCREMENT` field: no `PRIMARY KEY` clause;
//! - one `AUTOINCREMENT` field: `PRIMARY KEY("col" AUTOINCREMENT)`;
//! - otherwise: `PRIMARY KEY("a", "b", …)` in declaration order.
//!
//! Statements use `IF NOT EXISTS`, so they are safe to run on every start.

use clinical_records_core::{Constraints, FieldDescriptor, RecordType, validate_record_type};

use crate::error::Result;

/// Double-quotes an identifier, doubling embedded quotes.
pub(crate) fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Column definition for one field, e.g. `"id" INTEGER UNIQUE NOT NULL`.
pub fn column_definition(field: &FieldDescriptor) -> String {
    let mut def = format!(
        "{} {}",
        quote_identifier(field.name),
        field.semantic_type.storage_type()
    );
    if field.constraints.contains(Constraints::UNIQUE) {
        def.push_str(" UNIQUE");
    }
    if field.constraints.contains(Constraints::NOT_NULL) {
        def.push_str(" NOT NULL");
    }
    def
}

/// Generates the `CREATE TABLE IF NOT EXISTS` statement for a record type.
///
/// # Errors
///
/// Returns [`SqliteError::SchemaConflict`](crate::SqliteError::SchemaConflict)
/// with the first problem reported by
/// [`validate_record_type`](clinical_records_core::validate_record_type),
/// before any SQL is produced.
///
/// # Examples
///
/// ```
/// use clinical_records_core::{FieldDescriptor, RecordType};
/// use clinical_records_sqlite::create_table_sql;
///
/// static PATIENT: RecordType = RecordType {
///     name: "Patient",
///     fields: &[
///         FieldDescriptor::integer("id").primary_key().autoincrement().unique(),
///         FieldDescriptor::text("name"),
///     ],
/// };
///
/// assert_eq!(
///     create_table_sql(&PATIENT).unwrap(),
///     r#"CREATE TABLE IF NOT EXISTS 'Patient' ("id" INTEGER UNIQUE, "name" TEXT, PRIMARY KEY("id" AUTOINCREMENT));"#
/// );
/// ```
pub fn create_table_sql(record_type: &RecordType) -> Result<String> {
    if let Some(conflict) = validate_record_type(record_type).into_iter().next() {
        return Err(conflict.into());
    }

    let columns: Vec<String> = record_type.persisted_fields().map(column_definition).collect();
    let primary_keys: Vec<String> = record_type
        .primary_key_fields()
        .map(|f| quote_identifier(f.name))
        .collect();
    let autoincrement = record_type
        .persisted_fields()
        .find(|f| f.is_autoincrement())
        .map(|f| quote_identifier(f.name));

    let table = format!("'{}'", record_type.name.replace('\'', "''"));
    let columns = columns.join(", ");

    let sql = match (autoincrement, primary_keys.is_empty()) {
        (Some(column), _) => format!(
            "CREATE TABLE IF NOT EXISTS {table} ({columns}, PRIMARY KEY({column} AUTOINCREMENT));"
        ),
        (None, true) => format!("CREATE TABLE IF NOT EXISTS {table} ({columns});"),
        (None, false) => format!(
            "CREATE TABLE IF NOT EXISTS {table} ({columns}, PRIMARY KEY({}));",
            primary_keys.join(", ")
        ),
    };
    Ok(sql)
}

/// Generates `DROP TABLE IF EXISTS` for a record type.
pub fn drop_table_sql(record_type: &RecordType) -> String {
    format!("DROP TABLE IF EXISTS {};", quote_identifier(record_type.name))
}
