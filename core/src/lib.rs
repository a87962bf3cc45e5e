//! Record metadata and values for the clinical records store.
//!
//! This crate defines what the storage layer needs to know about a record
//! without touching a database:
//!
//! - [`FieldDescriptor`]: per-field constraints ([`Constraints`]), semantic
//!   type ([`SemanticType`]) and form metadata ([`DisplayMeta`]).
//! - [`RecordType`]: a static, ordered descriptor table; its name is the
//!   table name.
//! - [`RecordInstance`]: one [`Value`] per field, the dynamic form every
//!   statement builder consumes.
//! - [`Record`] and [`record!`]: typed structs bound to their descriptor
//!   table.
//! - [`map_type`]: semantic type to SQLite storage class.
//!
//! Validation ([`validate_record_type`]) rejects key layouts SQLite cannot
//! express, such as an `AUTOINCREMENT` column inside a composite key.
//!
//! # Example
//!
//! ```
//! use clinical_records_core::*;
//!
//! record! {
//!     #[derive(Debug, Default)]
//!     pub struct Allergy {
//!         pub id: i64 => integer().primary_key().autoincrement(),
//!         pub substance: Option<String> => optional_text().searchable(),
//!     }
//! }
//!
//! let rt = Allergy::RECORD_TYPE;
//! assert_eq!(rt.name, "Allergy");
//! assert!(validate_record_type(rt).is_empty());
//! assert_eq!(map_type(&rt.fields[1].semantic_type), StorageType::Text);
//! ```

mod constraint;
mod field;
pub mod models;
mod record;
mod types;
mod validate;
mod value;

pub use constraint::Constraints;
pub use field::{DisplayMeta, FieldDescriptor, InputWidget};
pub use record::{Record, RecordError, RecordInstance, RecordType};
pub use types::{SemanticType, StorageType, map_type};
pub use validate::{ValidationError, validate_record_type};
pub use value::{
    ConversionError, FromValue, ToValue, Value, decode_date_int, decode_date_str, encode_date,
};
