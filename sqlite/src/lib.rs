//! SQLite storage for declared record types.
//!
//! This crate turns the record metadata of
//! [`clinical_records_core`] into SQL and back:
//!
//! - **`schema`**: `CREATE TABLE` generation, with key clauses derived
//!   from field constraints
//! - **`statement`**: parameterized insert / update / delete / select
//!   built from record instances
//! - **`convert`**: value lowering (dates, lists) and the row mapper
//! - **`gateway`**: open, run, commit and close against one database file
//! - **`config`**: the injected database location
//!
//! # Quick start
//!
//! ```no_run
//! use clinical_records_core::RecordInstance;
//! use clinical_records_core::models::{CLINIC_RECORD_TYPES, Patient};
//! use clinical_records_core::Record;
//! use clinical_records_sqlite::{Comparator, DatabaseConfig, Gateway, SelectOptions};
//!
//! let gateway = Gateway::new(DatabaseConfig::new("clinic.db"));
//! gateway.make_database(&CLINIC_RECORD_TYPES);
//!
//! gateway.insert(&Patient::named("Juan Perez")).unwrap();
//!
//! let mut template = RecordInstance::blank(Patient::RECORD_TYPE);
//! template.set("nombre_completo", "%Juan%").unwrap();
//! let options = SelectOptions::new()
//!     .comparator(Comparator::Like)
//!     .ignore_primary_int(true);
//! let found: Vec<Patient> = gateway.search(&template, &options).unwrap();
//! println!("{} matches", found.len());
//! ```
//!
//! # Storage formats
//!
//! Dates are stored as `YYYYMMDD` integers in `INTEGER` columns. List
//! fields are stored as JSON array text. Statement values are always bound
//! as parameters; [`Statement::to_inline_sql`] renders the literal form for
//! logging.

mod config;
mod convert;
mod error;
mod gateway;
mod schema;
mod statement;

pub use config::{DEFAULT_DATABASE_PATH, DatabaseConfig};
pub use convert::{lower_value, row_to_record};
pub use error::{Result, SqliteError};
pub use gateway::{ExecuteOutcome, Gateway, MakeDatabaseReport};
pub use schema::{column_definition, create_table_sql, drop_table_sql};
pub use statement::{
    Comparator, InsertMode, SelectOptions, Statement, delete_statement, insert_statement,
    select_statement, sql_literal, update_statement,
};
