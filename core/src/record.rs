//! Record types, record instances and the [`Record`] trait.
//!
//! A [`RecordType`] is a static table of [`FieldDescriptor`]s whose name is
//! the SQL table name. A [`RecordInstance`] pairs a record type with one
//! [`Value`] per declared field; it is what the statement builders and the
//! row mapper work on. Typed structs declared with [`record!`](crate::record!)
//! implement [`Record`] and convert to and from instances.

use thiserror::Error;

use crate::field::FieldDescriptor;
use crate::value::{ConversionError, Value};

/// Errors raised while building or converting record instances.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum RecordError {
    /// Value count does not match the record type's field count.
    #[error("record type '{record}' has {expected} fields, got {found} values")]
    Arity {
        record: &'static str,
        expected: usize,
        found: usize,
    },

    /// Instance belongs to another record type.
    #[error("expected a '{expected}' instance, got '{found}'")]
    TypeMismatch {
        expected: &'static str,
        found: &'static str,
    },

    /// Named field is not declared by the record type.
    #[error("record type '{record}' has no field '{field}'")]
    UnknownField { record: &'static str, field: String },

    /// A field value has the wrong kind for the Rust field.
    #[error("field '{field}' of '{record}': {source}")]
    Field {
        record: &'static str,
        field: &'static str,
        #[source]
        source: ConversionError,
    },
}

/// A declared table: a name plus ordered field descriptors.
#[derive(Debug, PartialEq)]
pub struct RecordType {
    /// Table name.
    pub name: &'static str,
    /// Fields in declaration order, ignored ones included.
    pub fields: &'static [FieldDescriptor],
}

impl RecordType {
    pub const fn new(name: &'static str, fields: &'static [FieldDescriptor]) -> Self {
        Self { name, fields }
    }

    /// Looks up a field by name.
    pub fn field(&self, name: &str) -> Option<&'static FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Position of a field within [`fields`](Self::fields).
    pub fn field_index(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Fields that become table columns, in column order.
    pub fn persisted_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.fields.iter().filter(|f| f.is_persisted())
    }

    /// Number of table columns.
    pub fn column_count(&self) -> usize {
        self.persisted_fields().count()
    }

    /// Persisted key fields, `AUTOINCREMENT` ones included.
    pub fn primary_key_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.persisted_fields().filter(|f| f.is_primary_key())
    }

    pub fn has_primary_key(&self) -> bool {
        self.primary_key_fields().next().is_some()
    }

    /// Fields offered on search-by-example forms.
    pub fn searchable_fields(&self) -> impl Iterator<Item = &'static FieldDescriptor> {
        self.persisted_fields().filter(|f| f.display.searchable)
    }
}

/// One value per declared field of a record type.
///
/// # Examples
///
/// ```
/// use clinical_records_core::{FieldDescriptor, RecordInstance, RecordType, Value};
///
/// static NOTE: RecordType = RecordType {
///     name: "Note",
///     fields: &[FieldDescriptor::integer("id").autoincrement(), FieldDescriptor::optional_text("body")],
/// };
///
/// let mut note = RecordInstance::blank(&NOTE);
/// note.set("body", "hello").unwrap();
/// assert_eq!(note.get("body"), Some(&Value::Text("hello".into())));
/// assert_eq!(note.get("id"), Some(&Value::Null));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct RecordInstance {
    record_type: &'static RecordType,
    values: Vec<Value>,
}

impl RecordInstance {
    /// Creates an instance, checking that there is one value per field.
    pub fn new(record_type: &'static RecordType, values: Vec<Value>) -> Result<Self, RecordError> {
        if values.len() != record_type.fields.len() {
            return Err(RecordError::Arity {
                record: record_type.name,
                expected: record_type.fields.len(),
                found: values.len(),
            });
        }
        Ok(Self {
            record_type,
            values,
        })
    }

    /// Builds an instance without an arity check. Missing trailing values
    /// become [`Value::Null`] and surplus values are dropped.
    #[doc(hidden)]
    pub fn from_parts(record_type: &'static RecordType, mut values: Vec<Value>) -> Self {
        values.resize(record_type.fields.len(), Value::Null);
        Self {
            record_type,
            values,
        }
    }

    /// Creates an instance with every field set to [`Value::Null`], the
    /// usual starting point for a search-by-example template.
    pub fn blank(record_type: &'static RecordType) -> Self {
        Self {
            record_type,
            values: vec![Value::Null; record_type.fields.len()],
        }
    }

    /// Creates an instance with each field at its
    /// [default](FieldDescriptor::default_value).
    pub fn with_defaults(record_type: &'static RecordType) -> Self {
        Self {
            record_type,
            values: record_type.fields.iter().map(|f| f.default_value()).collect(),
        }
    }

    pub fn record_type(&self) -> &'static RecordType {
        self.record_type
    }

    pub fn values(&self) -> &[Value] {
        &self.values
    }

    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.record_type
            .field_index(field)
            .and_then(|idx| self.values.get(idx))
    }

    /// Replaces the value of a field.
    ///
    /// # Errors
    ///
    /// Returns [`RecordError::UnknownField`] if the record type has no such
    /// field.
    pub fn set(&mut self, field: &str, value: impl Into<Value>) -> Result<(), RecordError> {
        let idx = self
            .record_type
            .field_index(field)
            .ok_or_else(|| RecordError::UnknownField {
                record: self.record_type.name,
                field: field.to_string(),
            })?;
        if let Some(slot) = self.values.get_mut(idx) {
            *slot = value.into();
        }
        Ok(())
    }

    /// Iterates over `(descriptor, value)` pairs in declaration order.
    pub fn fields(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &Value)> {
        self.record_type.fields.iter().zip(self.values.iter())
    }

    /// Like [`fields`](Self::fields), skipping ignored fields.
    pub fn persisted(&self) -> impl Iterator<Item = (&'static FieldDescriptor, &Value)> {
        self.fields().filter(|(f, _)| f.is_persisted())
    }
}

/// A Rust type with a static record type.
///
/// Implemented by [`record!`](crate::record!); hand implementations must
/// keep [`to_instance`](Self::to_instance) aligned with
/// `RECORD_TYPE.fields`.
pub trait Record: Sized {
    /// Descriptor table for this type.
    const RECORD_TYPE: &'static RecordType;

    /// Snapshot of every field as a dynamic instance.
    fn to_instance(&self) -> RecordInstance;

    /// Rebuilds the typed record from an instance of the same record type.
    fn from_instance(instance: RecordInstance) -> Result<Self, RecordError>;
}

/// Declares a struct together with its [`RecordType`] and [`Record`] impl.
///
/// Each field names its Rust type and a [`FieldDescriptor`] constructor
/// (called with the field name) followed by any builder methods.
///
/// ```
/// use clinical_records_core::{Record, record};
///
/// record! {
///     #[derive(Debug, Clone, Default, PartialEq)]
///     pub struct Note {
///         pub id: i64 => integer().primary_key().autoincrement(),
///         pub body: Option<String> => optional_text().title("Body"),
///     }
/// }
///
/// assert_eq!(Note::RECORD_TYPE.name, "Note");
/// assert_eq!(Note::FIELDS.len(), 2);
///
/// let note = Note { id: 3, body: Some("hi".into()) };
/// let back = Note::from_instance(note.to_instance()).unwrap();
/// assert_eq!(back, note);
/// ```
#[macro_export]
macro_rules! record {
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty =>
                    $kind:ident ( $($kind_arg:expr),* $(,)? )
                    $( . $method:ident ( $($arg:expr),* $(,)? ) )*
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $name {
            /// Field descriptors in declaration order.
            pub const FIELDS: &'static [$crate::FieldDescriptor] = &[
                $(
                    $crate::FieldDescriptor::$kind(stringify!($field) $(, $kind_arg)*)
                        $( .$method($($arg),*) )*,
                )*
            ];
        }

        impl $crate::Record for $name {
            const RECORD_TYPE: &'static $crate::RecordType =
                &$crate::RecordType::new(stringify!($name), Self::FIELDS);

            fn to_instance(&self) -> $crate::RecordInstance {
                $crate::RecordInstance::from_parts(
                    Self::RECORD_TYPE,
                    vec![$($crate::ToValue::to_value(&self.$field)),*],
                )
            }

            fn from_instance(
                instance: $crate::RecordInstance,
            ) -> ::std::result::Result<Self, $crate::RecordError> {
                let record = Self::RECORD_TYPE.name;
                if instance.record_type().name != record {
                    return Err($crate::RecordError::TypeMismatch {
                        expected: record,
                        found: instance.record_type().name,
                    });
                }
                let mut values = instance.into_values().into_iter();
                Ok(Self {
                    $(
                        $field: $crate::FromValue::from_value(
                            values.next().unwrap_or($crate::Value::Null),
                        )
                        .map_err(|source| $crate::RecordError::Field {
                            record,
                            field: stringify!($field),
                            source,
                        })?,
                    )*
                })
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    static VISIT: RecordType = RecordType {
        name: "Visit",
        fields: &[
            FieldDescriptor::integer("id").primary_key().autoincrement(),
            FieldDescriptor::separator("lb_header"),
            FieldDescriptor::optional_text("reason").searchable(),
            FieldDescriptor::optional_date("follow_up"),
        ],
    };

    #[test]
    fn test_new_checks_arity() {
        let err = RecordInstance::new(&VISIT, vec![Value::Null]).unwrap_err();
        assert_eq!(
            err,
            RecordError::Arity {
                record: "Visit",
                expected: 4,
                found: 1
            }
        );
    }

    #[test]
    fn test_from_parts_normalizes_width() {
        let short = RecordInstance::from_parts(&VISIT, vec![Value::Integer(7)]);
        assert_eq!(short.values().len(), 4);
        assert_eq!(short.get("id"), Some(&Value::Integer(7)));
        assert_eq!(short.get("follow_up"), Some(&Value::Null));

        let mut long = RecordInstance::from_parts(&VISIT, vec![Value::Null; 6]);
        assert_eq!(long.values().len(), 4);
        long.set("follow_up", 20250601_i64).unwrap();
        assert_eq!(long.get("follow_up"), Some(&Value::Integer(20250601)));
    }

    #[test]
    fn test_persisted_fields_skip_ignored() {
        let names: Vec<_> = VISIT.persisted_fields().map(|f| f.name).collect();
        assert_eq!(names, vec!["id", "reason", "follow_up"]);
        assert_eq!(VISIT.column_count(), 3);
    }

    #[test]
    fn test_primary_key_and_searchable() {
        let keys: Vec<_> = VISIT.primary_key_fields().map(|f| f.name).collect();
        assert_eq!(keys, vec!["id"]);
        assert!(VISIT.has_primary_key());
        let searchable: Vec<_> = VISIT.searchable_fields().map(|f| f.name).collect();
        assert_eq!(searchable, vec!["reason"]);
    }

    #[test]
    fn test_set_unknown_field() {
        let mut visit = RecordInstance::blank(&VISIT);
        let err = visit.set("nope", 1i64).unwrap_err();
        assert!(matches!(err, RecordError::UnknownField { .. }));
    }

    #[test]
    fn test_with_defaults() {
        let visit = RecordInstance::with_defaults(&VISIT);
        assert_eq!(visit.get("id"), Some(&Value::Integer(0)));
        assert_eq!(visit.get("lb_header"), Some(&Value::Integer(0)));
        assert_eq!(visit.get("reason"), Some(&Value::Null));
    }

    #[test]
    fn test_persisted_iteration() {
        let mut visit = RecordInstance::blank(&VISIT);
        visit.set("reason", "checkup").unwrap();
        let pairs: Vec<_> = visit.persisted().map(|(f, v)| (f.name, v.clone())).collect();
        assert_eq!(pairs.len(), 3);
        assert_eq!(pairs[1], ("reason", Value::Text("checkup".into())));
    }

    crate::record! {
        #[derive(Debug, Clone, Default, PartialEq)]
        struct Tag {
            id: i64 => integer().primary_key(),
            label: String => text().not_null(),
        }
    }

    #[test]
    fn test_macro_round_trip() {
        let tag = Tag {
            id: 7,
            label: "urgent".into(),
        };
        let instance = tag.to_instance();
        assert_eq!(instance.values()[1], Value::Text("urgent".into()));
        assert_eq!(Tag::from_instance(instance).unwrap(), tag);
    }

    #[test]
    fn test_macro_rejects_other_record_type() {
        let err = Tag::from_instance(RecordInstance::blank(&VISIT)).unwrap_err();
        assert_eq!(
            err,
            RecordError::TypeMismatch {
                expected: "Tag",
                found: "Visit"
            }
        );
    }

    #[test]
    fn test_macro_reports_field_errors() {
        let instance =
            RecordInstance::new(Tag::RECORD_TYPE, vec![Value::Integer(1), Value::Null]).unwrap();
        let err = Tag::from_instance(instance).unwrap_err();
        assert!(matches!(err, RecordError::Field { field: "label", .. }));
    }
}
