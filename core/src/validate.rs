//! Record type validation.
//!
//! SQLite only accepts `AUTOINCREMENT` on a single `INTEGER PRIMARY KEY`
//! column. These checks reject record types that would otherwise produce a
//! malformed or silently inconsistent `CREATE TABLE` statement.
//!
//! # Examples
//!
//! ```
//! use clinical_records_core::*;
//!
//! static VISIT: RecordType = RecordType {
//!     name: "Visit",
//!     fields: &[
//!         FieldDescriptor::integer("id").primary_key().autoincrement(),
//!         FieldDescriptor::integer("clinic").primary_key(),
//!     ],
//! };
//!
//! let errors = validate_record_type(&VISIT);
//! assert!(matches!(errors[0], ValidationError::AutoincrementWithCompositeKey { .. }));
//! ```

use std::collections::HashSet;

use thiserror::Error;

use crate::record::RecordType;

/// Structural problems in a record type declaration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("record type name cannot be empty")]
    EmptyRecordName,

    /// Every field is ignored, so there is no column to create.
    #[error("record type '{0}' has no persisted fields")]
    NoColumns(String),

    #[error("duplicate field '{field}' in record type '{record}'")]
    DuplicateField { record: String, field: String },

    #[error("record type '{record}' declares more than one AUTOINCREMENT field: {fields:?}")]
    MultipleAutoincrement { record: String, fields: Vec<String> },

    #[error(
        "AUTOINCREMENT field '{field}' of '{record}' must be the only primary key, \
         but {others:?} are primary keys too"
    )]
    AutoincrementWithCompositeKey {
        record: String,
        field: String,
        others: Vec<String>,
    },

    #[error("AUTOINCREMENT field '{field}' of '{record}' must be an integer")]
    AutoincrementNotInteger { record: String, field: String },
}

/// Validates a record type, returning every problem found.
///
/// Ignored fields are not columns and take no part in key checks.
pub fn validate_record_type(record_type: &RecordType) -> Vec<ValidationError> {
    let mut errors = Vec::new();
    let record = record_type.name.to_string();

    if record_type.name.trim().is_empty() {
        errors.push(ValidationError::EmptyRecordName);
    }

    let mut seen = HashSet::new();
    for field in record_type.fields {
        if !seen.insert(field.name) {
            errors.push(ValidationError::DuplicateField {
                record: record.clone(),
                field: field.name.to_string(),
            });
        }
    }

    if record_type.column_count() == 0 {
        errors.push(ValidationError::NoColumns(record.clone()));
    }

    let autoincrement: Vec<_> = record_type
        .persisted_fields()
        .filter(|f| f.is_autoincrement())
        .collect();

    match autoincrement.as_slice() {
        [] => {}
        [field] => {
            if !field.semantic_type.is_integer() {
                errors.push(ValidationError::AutoincrementNotInteger {
                    record: record.clone(),
                    field: field.name.to_string(),
                });
            }
            let others: Vec<String> = record_type
                .primary_key_fields()
                .filter(|f| f.name != field.name)
                .map(|f| f.name.to_string())
                .collect();
            if !others.is_empty() {
                errors.push(ValidationError::AutoincrementWithCompositeKey {
                    record: record.clone(),
                    field: field.name.to_string(),
                    others,
                });
            }
        }
        many => errors.push(ValidationError::MultipleAutoincrement {
            record,
            fields: many.iter().map(|f| f.name.to_string()).collect(),
        }),
    }

    errors
}
