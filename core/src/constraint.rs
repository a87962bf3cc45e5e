//! Column constraint sets attached to record fields.

use bitflags::bitflags;

bitflags! {
    /// A set of SQLite column constraints.
    ///
    /// Constraints combine with `|` at runtime, or with `union` inside
    /// `const` descriptor tables.
    ///
    /// # Examples
    ///
    /// ```
    /// use clinical_records_core::Constraints;
    ///
    /// let key = Constraints::PRIMARY_KEY | Constraints::AUTOINCREMENT;
    /// assert!(key.contains(Constraints::PRIMARY_KEY));
    /// assert!(!key.contains(Constraints::UNIQUE));
    /// assert!(Constraints::NONE.is_empty());
    /// ```
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct Constraints: u8 {
        /// Column is part of the primary key.
        const PRIMARY_KEY = 0b0000_0001;
        /// Column is `NOT NULL`.
        const NOT_NULL = 0b0000_0010;
        /// Column value is assigned by SQLite.
        const AUTOINCREMENT = 0b0000_0100;
        /// Column is `UNIQUE`.
        const UNIQUE = 0b0000_1000;
        /// Field lives only in memory and never reaches SQL.
        const IGNORE = 0b0001_0000;
    }
}

impl Constraints {
    /// No constraint.
    pub const NONE: Self = Self::empty();
}

impl Default for Constraints {
    fn default() -> Self {
        Self::NONE
    }
}
