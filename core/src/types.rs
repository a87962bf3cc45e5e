//! Semantic field types and their SQLite storage classes.
//!
//! Every field declares a [`SemanticType`]; [`map_type`] decides which
//! column type it is stored as. Dates are stored as compact `YYYYMMDD`
//! integers and list fields as JSON text, and the same mapping is used for
//! schema generation, parameter binding and row decoding.

use std::fmt;

use crate::record::RecordType;

/// Declared type of a record field.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SemanticType {
    /// Signed 64-bit integer.
    Integer,
    /// Double precision float.
    Real,
    /// UTF-8 text.
    Text,
    /// Calendar date without time.
    Date,
    /// List of nested records, serialized as a JSON array.
    List(&'static RecordType),
    /// Nullable wrapper around another semantic type.
    Optional(&'static SemanticType),
}

impl SemanticType {
    /// Returns the innermost type, unwrapping any [`Optional`](Self::Optional).
    ///
    /// # Examples
    ///
    /// ```
    /// use clinical_records_core::SemanticType;
    ///
    /// let ty = SemanticType::Optional(&SemanticType::Date);
    /// assert_eq!(*ty.base(), SemanticType::Date);
    /// assert!(ty.is_optional());
    /// ```
    pub fn base(&self) -> &SemanticType {
        match self {
            SemanticType::Optional(inner) => inner.base(),
            other => other,
        }
    }

    /// Returns `true` for [`Optional`](Self::Optional) types.
    pub fn is_optional(&self) -> bool {
        matches!(self, SemanticType::Optional(_))
    }

    pub fn is_integer(&self) -> bool {
        matches!(self.base(), SemanticType::Integer)
    }

    pub fn is_date(&self) -> bool {
        matches!(self.base(), SemanticType::Date)
    }

    /// Returns the element record type for list fields.
    pub fn list_element(&self) -> Option<&'static RecordType> {
        match self.base() {
            SemanticType::List(element) => Some(element),
            _ => None,
        }
    }

    /// Storage class for this type, see [`map_type`].
    pub fn storage_type(&self) -> StorageType {
        map_type(self)
    }
}

/// SQLite column storage class.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StorageType {
    Integer,
    Real,
    Text,
}

impl StorageType {
    /// SQL keyword used in column definitions.
    pub fn as_sql(self) -> &'static str {
        match self {
            StorageType::Integer => "INTEGER",
            StorageType::Real => "REAL",
            StorageType::Text => "TEXT",
        }
    }
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_sql())
    }
}

/// Maps a semantic type to its column storage class.
///
/// Dates map to `INTEGER` (`YYYYMMDD`) and lists to `TEXT` (JSON array).
/// Optional types map like their inner type.
///
/// # Examples
///
/// ```
/// use clinical_records_core::{SemanticType, StorageType, map_type};
///
/// assert_eq!(map_type(&SemanticType::Real), StorageType::Real);
/// assert_eq!(map_type(&SemanticType::Date), StorageType::Integer);
/// assert_eq!(map_type(&SemanticType::Optional(&SemanticType::Text)), StorageType::Text);
/// ```
pub fn map_type(semantic_type: &SemanticType) -> StorageType {
    match semantic_type.base() {
        SemanticType::Integer | SemanticType::Date => StorageType::Integer,
        SemanticType::Real => StorageType::Real,
        _ => StorageType::Text,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDescriptor;

    const NOTES: RecordType = RecordType {
        name: "Note",
        fields: &[FieldDescriptor::text("body")],
    };

    #[test]
    fn test_scalar_mappings() {
        assert_eq!(map_type(&SemanticType::Integer), StorageType::Integer);
        assert_eq!(map_type(&SemanticType::Real), StorageType::Real);
        assert_eq!(map_type(&SemanticType::Text), StorageType::Text);
        assert_eq!(map_type(&SemanticType::Date), StorageType::Integer);
    }

    #[test]
    fn test_list_maps_to_text() {
        let ty = SemanticType::List(&NOTES);
        assert_eq!(map_type(&ty), StorageType::Text);
        assert_eq!(ty.list_element().map(|rt| rt.name), Some("Note"));
    }

    #[test]
    fn test_nested_optional_unwraps() {
        const INNER: SemanticType = SemanticType::Optional(&SemanticType::Real);
        let ty = SemanticType::Optional(&INNER);
        assert_eq!(*ty.base(), SemanticType::Real);
        assert_eq!(ty.storage_type(), StorageType::Real);
    }

    #[test]
    fn test_storage_type_display() {
        assert_eq!(StorageType::Integer.to_string(), "INTEGER");
        assert_eq!(StorageType::Text.as_sql(), "TEXT");
    }
}
