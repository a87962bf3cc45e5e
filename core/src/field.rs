//! Field descriptors: per-field constraints and display metadata.
//!
//! A [`FieldDescriptor`] is a plain `const`-constructible value, so record
//! types are declared as static descriptor tables and never discovered
//! through runtime reflection. The builder methods are all `const fn`:
//!
//! ```
//! use clinical_records_core::{Constraints, FieldDescriptor};
//!
//! const ID: FieldDescriptor = FieldDescriptor::integer("id")
//!     .primary_key()
//!     .autoincrement()
//!     .title("Codigo")
//!     .readonly();
//!
//! assert!(ID.constraints.contains(Constraints::PRIMARY_KEY));
//! assert!(ID.is_engine_assigned());
//! assert_eq!(ID.display.title, "Codigo");
//! ```

use crate::constraint::Constraints;
use crate::record::RecordType;
use crate::types::SemanticType;
use crate::value::Value;

/// Kind of input control a form renders for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputWidget {
    None,
    Separator,
    InputText,
    InputTextRich,
    InputInt,
    InputFloat,
    Combo,
    DatePicker,
    List,
}

/// Presentation metadata for a field.
///
/// The storage layer only reads [`searchable`](Self::searchable); the rest
/// is carried for the form layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DisplayMeta {
    pub control: InputWidget,
    pub title: &'static str,
    pub readonly: bool,
    pub required: bool,
    /// Choices offered by combo controls.
    pub items: &'static [&'static str],
    /// Field appears on search-by-example forms.
    pub searchable: bool,
    /// Field appears as a column in result tables.
    pub show_in_table: bool,
}

impl DisplayMeta {
    const fn for_control(control: InputWidget) -> Self {
        Self {
            control,
            title: "",
            readonly: false,
            required: false,
            items: &[],
            searchable: false,
            show_in_table: true,
        }
    }
}

/// Metadata for one field of a record type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldDescriptor {
    /// Field and column name.
    pub name: &'static str,
    pub semantic_type: SemanticType,
    pub constraints: Constraints,
    pub display: DisplayMeta,
}

impl FieldDescriptor {
    /// Creates a descriptor with no constraints and a control matching the
    /// type.
    pub const fn new(name: &'static str, semantic_type: SemanticType) -> Self {
        let control = match semantic_type {
            SemanticType::Integer => InputWidget::InputInt,
            SemanticType::Real => InputWidget::InputFloat,
            SemanticType::Date => InputWidget::DatePicker,
            SemanticType::List(_) => InputWidget::List,
            SemanticType::Optional(SemanticType::Integer) => InputWidget::InputInt,
            SemanticType::Optional(SemanticType::Real) => InputWidget::InputFloat,
            SemanticType::Optional(SemanticType::Date) => InputWidget::DatePicker,
            _ => InputWidget::InputText,
        };
        Self {
            name,
            semantic_type,
            constraints: Constraints::NONE,
            display: DisplayMeta::for_control(control),
        }
    }

    pub const fn integer(name: &'static str) -> Self {
        Self::new(name, SemanticType::Integer)
    }

    pub const fn real(name: &'static str) -> Self {
        Self::new(name, SemanticType::Real)
    }

    pub const fn text(name: &'static str) -> Self {
        Self::new(name, SemanticType::Text)
    }

    pub const fn date(name: &'static str) -> Self {
        Self::new(name, SemanticType::Date)
    }

    pub const fn optional_integer(name: &'static str) -> Self {
        Self::new(name, SemanticType::Optional(&SemanticType::Integer))
    }

    pub const fn optional_real(name: &'static str) -> Self {
        Self::new(name, SemanticType::Optional(&SemanticType::Real))
    }

    pub const fn optional_text(name: &'static str) -> Self {
        Self::new(name, SemanticType::Optional(&SemanticType::Text))
    }

    pub const fn optional_date(name: &'static str) -> Self {
        Self::new(name, SemanticType::Optional(&SemanticType::Date))
    }

    /// A list of nested `element` records, stored as JSON text.
    pub const fn list(name: &'static str, element: &'static RecordType) -> Self {
        Self::new(name, SemanticType::List(element))
    }

    /// A form section header: an ignored integer field rendered as a
    /// separator with the given title.
    pub const fn separator(name: &'static str) -> Self {
        Self::integer(name)
            .ignore()
            .control(InputWidget::Separator)
            .hidden_in_table()
    }

    /// Adds every constraint in `constraints`.
    pub const fn constraints(self, constraints: Constraints) -> Self {
        Self {
            constraints: self.constraints.union(constraints),
            ..self
        }
    }

    pub const fn primary_key(self) -> Self {
        self.constraints(Constraints::PRIMARY_KEY)
    }

    pub const fn autoincrement(self) -> Self {
        self.constraints(Constraints::AUTOINCREMENT)
    }

    pub const fn unique(self) -> Self {
        self.constraints(Constraints::UNIQUE)
    }

    pub const fn not_null(self) -> Self {
        self.constraints(Constraints::NOT_NULL)
    }

    pub const fn ignore(self) -> Self {
        self.constraints(Constraints::IGNORE)
    }

    pub const fn control(self, control: InputWidget) -> Self {
        Self {
            display: DisplayMeta {
                control,
                ..self.display
            },
            ..self
        }
    }

    pub const fn title(self, title: &'static str) -> Self {
        Self {
            display: DisplayMeta {
                title,
                ..self.display
            },
            ..self
        }
    }

    pub const fn readonly(self) -> Self {
        Self {
            display: DisplayMeta {
                readonly: true,
                ..self.display
            },
            ..self
        }
    }

    pub const fn required(self) -> Self {
        Self {
            display: DisplayMeta {
                required: true,
                ..self.display
            },
            ..self
        }
    }

    /// Combo choices; also switches the control to [`InputWidget::Combo`].
    pub const fn items(self, items: &'static [&'static str]) -> Self {
        Self {
            display: DisplayMeta {
                items,
                control: InputWidget::Combo,
                ..self.display
            },
            ..self
        }
    }

    pub const fn searchable(self) -> Self {
        Self {
            display: DisplayMeta {
                searchable: true,
                ..self.display
            },
            ..self
        }
    }

    pub const fn hidden_in_table(self) -> Self {
        Self {
            display: DisplayMeta {
                show_in_table: false,
                ..self.display
            },
            ..self
        }
    }

    /// Field takes part in generated SQL (it is not `IGNORE`).
    pub fn is_persisted(&self) -> bool {
        !self.constraints.contains(Constraints::IGNORE)
    }

    /// Field is part of the table key. An `AUTOINCREMENT` field is always
    /// the key, even without an explicit `PRIMARY_KEY`.
    pub fn is_primary_key(&self) -> bool {
        self.constraints.contains(Constraints::PRIMARY_KEY)
            || self.constraints.contains(Constraints::AUTOINCREMENT)
    }

    pub fn is_autoincrement(&self) -> bool {
        self.constraints.contains(Constraints::AUTOINCREMENT)
    }

    /// SQLite assigns this column on insert: a persisted `AUTOINCREMENT`
    /// integer.
    pub fn is_engine_assigned(&self) -> bool {
        self.is_persisted() && self.is_autoincrement() && self.semantic_type.is_integer()
    }

    /// Integer key column, the target of "ignore primary int" searches.
    pub fn is_integer_primary_key(&self) -> bool {
        self.is_primary_key() && self.semantic_type.is_integer()
    }

    /// Value an instance holds for this field when nothing was loaded.
    ///
    /// Nullable and date fields default to [`Value::Null`]; the rest take
    /// the zero value of their type.
    pub fn default_value(&self) -> Value {
        match self.semantic_type {
            SemanticType::Optional(_) | SemanticType::Date => Value::Null,
            SemanticType::Integer => Value::Integer(0),
            SemanticType::Real => Value::Real(0.0),
            SemanticType::Text => Value::Text(String::new()),
            SemanticType::List(_) => Value::List(Vec::new()),
        }
    }
}
