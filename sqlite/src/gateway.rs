//! Statement execution against the configured database file.
//!
//! [`Gateway`] holds only a [`DatabaseConfig`]. Every call opens a
//! connection, runs its work inside a transaction, commits and closes the
//! connection again; nothing is shared between calls, and SQLite's file
//! locking is the only coordination between processes.

use clinical_records_core::{Record, RecordInstance, RecordType};
use rusqlite::{Connection, params_from_iter};
use tracing::{debug, error, info};

use crate::config::DatabaseConfig;
use crate::convert::{read_row, row_to_record, to_sql_value};
use crate::error::{Result, SqliteError};
use crate::schema::create_table_sql;
use crate::statement::{
    InsertMode, SelectOptions, Statement, delete_statement, insert_statement, select_statement,
    update_statement,
};

/// Result of a data-modifying statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecuteOutcome {
    pub rows_affected: usize,
    /// Rowid of the most recent successful insert on the connection, `0`
    /// if there was none.
    pub last_insert_rowid: i64,
}

/// Outcome of [`Gateway::make_database`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MakeDatabaseReport {
    /// Record types whose table exists after the call.
    pub created: Vec<&'static str>,
    /// Record types that failed, with the error message.
    pub failed: Vec<(&'static str, String)>,
}

impl MakeDatabaseReport {
    pub fn is_success(&self) -> bool {
        self.failed.is_empty()
    }
}

/// Runs statements against one SQLite file.
///
/// # Examples
///
/// ```no_run
/// use clinical_records_core::Record;
/// use clinical_records_core::models::{CLINIC_RECORD_TYPES, Patient};
/// use clinical_records_sqlite::{DatabaseConfig, Gateway};
///
/// let gateway = Gateway::new(DatabaseConfig::new("clinic.db"));
/// let report = gateway.make_database(&CLINIC_RECORD_TYPES);
/// assert!(report.is_success());
///
/// let id = gateway.insert(&Patient::named("Juan O'Brien")).unwrap();
/// let loaded: Option<Patient> = gateway.get_by_id(id).unwrap();
/// assert_eq!(loaded.unwrap().nombre_completo.as_deref(), Some("Juan O'Brien"));
/// ```
#[derive(Debug, Clone)]
pub struct Gateway {
    config: DatabaseConfig,
}

impl Gateway {
    pub fn new(config: DatabaseConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DatabaseConfig {
        &self.config
    }

    fn connect(&self) -> Result<Connection> {
        Ok(Connection::open(&self.config.path)?)
    }

    fn close(conn: Connection) -> Result<()> {
        conn.close().map_err(|(_, err)| err)?;
        Ok(())
    }

    /// Executes a data-modifying statement and commits it.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::DatabaseError`] if the connection cannot be
    /// opened or the statement fails; nothing is committed in that case.
    pub fn execute(&self, statement: &Statement) -> Result<ExecuteOutcome> {
        debug!(sql = %statement.to_inline_sql(), "Executing statement");
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        let rows_affected = tx.execute(
            statement.sql(),
            params_from_iter(statement.params().iter().map(to_sql_value)),
        )?;
        let last_insert_rowid = tx.last_insert_rowid();
        tx.commit()?;
        Self::close(conn)?;
        Ok(ExecuteOutcome {
            rows_affected,
            last_insert_rowid,
        })
    }

    /// Executes one or more parameterless SQL statements, such as DDL.
    pub fn execute_sql(&self, sql: &str) -> Result<()> {
        debug!(sql, "Executing batch");
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;
        tx.execute_batch(sql)?;
        tx.commit()?;
        Self::close(conn)
    }

    /// Runs a `SELECT *` and hands each mapped row to `on_row`, in result
    /// order, before the call returns. Returns the number of rows.
    ///
    /// # Errors
    ///
    /// Stops at the first failing row: driver errors surface as
    /// [`SqliteError::DatabaseError`] and a row whose width does not match
    /// `record_type` as [`SqliteError::RowArity`]. Rows already delivered
    /// stay delivered.
    pub fn execute_select<F>(
        &self,
        record_type: &'static RecordType,
        statement: &Statement,
        mut on_row: F,
    ) -> Result<usize>
    where
        F: FnMut(RecordInstance),
    {
        debug!(sql = %statement.to_inline_sql(), "Executing select");
        let conn = self.connect()?;
        let mut count = 0;
        {
            let mut prepared = conn.prepare(statement.sql())?;
            let mut rows =
                prepared.query(params_from_iter(statement.params().iter().map(to_sql_value)))?;
            while let Some(row) = rows.next()? {
                let instance = row_to_record(record_type, read_row(row)?)?;
                on_row(instance);
                count += 1;
            }
        }
        Self::close(conn)?;
        Ok(count)
    }

    /// Creates the table of every record type that does not exist yet.
    ///
    /// A failing record type is logged with its SQL and skipped; the
    /// remaining types are still attempted.
    pub fn make_database(&self, record_types: &[&'static RecordType]) -> MakeDatabaseReport {
        let mut report = MakeDatabaseReport::default();
        for record_type in record_types {
            let sql = match create_table_sql(record_type) {
                Ok(sql) => sql,
                Err(err) => {
                    error!(record_type = record_type.name, error = %err, "Cannot generate table");
                    report.failed.push((record_type.name, err.to_string()));
                    continue;
                }
            };
            match self.execute_sql(&sql) {
                Ok(()) => {
                    info!(record_type = record_type.name, "Table ready");
                    report.created.push(record_type.name);
                }
                Err(err) => {
                    error!(
                        record_type = record_type.name,
                        sql = %sql,
                        error = %err,
                        "Cannot create table"
                    );
                    report.failed.push((record_type.name, err.to_string()));
                }
            }
        }
        report
    }

    /// Inserts an instance and returns the rowid SQLite assigned.
    pub fn insert_instance(&self, instance: &RecordInstance, mode: InsertMode) -> Result<i64> {
        let outcome = self.execute(&insert_statement(instance, mode))?;
        Ok(outcome.last_insert_rowid)
    }

    /// Inserts a typed record and returns its new rowid.
    pub fn insert<R: Record>(&self, record: &R) -> Result<i64> {
        self.insert_instance(&record.to_instance(), InsertMode::Insert)
    }

    /// Rewrites the row matching `old` with the values of `new`. Returns the
    /// number of rows changed.
    pub fn update<R: Record>(&self, old: &R, new: &R) -> Result<usize> {
        let statement = update_statement(&old.to_instance(), &new.to_instance())?;
        Ok(self.execute(&statement)?.rows_affected)
    }

    /// Deletes the row identified by `record`. Returns the number of rows
    /// removed.
    pub fn delete<R: Record>(&self, record: &R) -> Result<usize> {
        let statement = delete_statement(&record.to_instance())?;
        Ok(self.execute(&statement)?.rows_affected)
    }

    /// Search-by-example: selects the rows matching the non-null fields of
    /// `template` and converts them to `R`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::TypeMismatch`] if `template` is not an
    /// instance of `R`'s record type.
    pub fn search<R: Record>(
        &self,
        template: &RecordInstance,
        options: &SelectOptions,
    ) -> Result<Vec<R>> {
        if template.record_type().name != R::RECORD_TYPE.name {
            return Err(SqliteError::TypeMismatch {
                old: R::RECORD_TYPE.name,
                new: template.record_type().name,
            });
        }
        let mut instances = Vec::new();
        self.execute_select(
            R::RECORD_TYPE,
            &select_statement(template, options),
            |instance| instances.push(instance),
        )?;
        instances
            .into_iter()
            .map(|instance| R::from_instance(instance).map_err(SqliteError::from))
            .collect()
    }

    /// Loads the record whose integer key equals `id`.
    ///
    /// # Errors
    ///
    /// Returns [`SqliteError::NoIntegerKey`] if `R` has no integer key
    /// field.
    pub fn get_by_id<R: Record>(&self, id: i64) -> Result<Option<R>> {
        let record_type = R::RECORD_TYPE;
        let key = record_type
            .persisted_fields()
            .find(|f| f.is_integer_primary_key())
            .ok_or(SqliteError::NoIntegerKey(record_type.name))?;

        let mut template = RecordInstance::blank(record_type);
        template.set(key.name, id)?;
        let mut found = self.search::<R>(&template, &SelectOptions::new().limit(1))?;
        Ok(found.pop())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clinical_records_core::{FieldDescriptor, Value};

    static COUNTER: RecordType = RecordType {
        name: "Counter",
        fields: &[
            FieldDescriptor::integer("id").primary_key().autoincrement(),
            FieldDescriptor::optional_text("label"),
        ],
    };

    fn gateway(dir: &tempfile::TempDir) -> Gateway {
        Gateway::new(DatabaseConfig::new(dir.path().join("test.db")))
    }

    #[test]
    fn test_execute_reports_rowid_and_rows() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway(&dir);
        assert!(gateway.make_database(&[&COUNTER]).is_success());

        let mut counter = RecordInstance::blank(&COUNTER);
        counter.set("label", "first").unwrap();
        let outcome = gateway
            .execute(&insert_statement(&counter, InsertMode::Insert))
            .unwrap();
        assert_eq!(outcome.rows_affected, 1);
        assert_eq!(outcome.last_insert_rowid, 1);

        assert_eq!(gateway.insert_instance(&counter, InsertMode::Insert).unwrap(), 2);
    }

    #[test]
    fn test_execute_select_delivers_rows_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway(&dir);
        gateway.make_database(&[&COUNTER]);
        for label in ["a", "b", "c"] {
            let mut counter = RecordInstance::blank(&COUNTER);
            counter.set("label", label).unwrap();
            gateway.insert_instance(&counter, InsertMode::Insert).unwrap();
        }

        let mut labels = Vec::new();
        let count = gateway
            .execute_select(
                &COUNTER,
                &select_statement(&RecordInstance::blank(&COUNTER), &SelectOptions::new()),
                |row| labels.push(row.get("label").cloned()),
            )
            .unwrap();
        assert_eq!(count, 3);
        assert_eq!(
            labels,
            vec![
                Some(Value::Text("a".into())),
                Some(Value::Text("b".into())),
                Some(Value::Text("c".into())),
            ]
        );
    }

    #[test]
    fn test_failed_statement_is_not_committed() {
        let dir = tempfile::tempdir().unwrap();
        let gateway = gateway(&dir);
        let err = gateway
            .execute_sql("CREATE TABLE t (a INTEGER); INSERT INTO missing VALUES (1);")
            .unwrap_err();
        assert!(matches!(err, SqliteError::DatabaseError(_)));
        // the batch rolled back, so the table was not created
        gateway.execute_sql("CREATE TABLE t (a INTEGER);").unwrap();
    }
}
