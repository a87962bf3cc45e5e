//! Database configuration.
//!
//! The database location is injected at startup rather than compiled in.
//! It can be built in code or loaded from a YAML file:
//!
//! ```yaml
//! path: /var/lib/clinic/clinic.db
//! ```

use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE_PATH: &str = "clinic.db";

/// Where the SQLite database lives.
///
/// # Examples
///
/// ```
/// use clinical_records_sqlite::DatabaseConfig;
///
/// let config = DatabaseConfig::new("/tmp/clinic.db");
/// assert_eq!(config.path.to_str(), Some("/tmp/clinic.db"));
/// assert_eq!(DatabaseConfig::default().path.to_str(), Some("clinic.db"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Path of the SQLite file; created on first use.
    pub path: PathBuf,
}

impl DatabaseConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::SqliteError::IoError) if the file cannot
    /// be read, or [`ConfigError`](crate::SqliteError::ConfigError) if
    /// parsing fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let reader = BufReader::new(file);
        let config = serde_yaml::from_reader(reader)?;
        Ok(config)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self::new(DEFAULT_DATABASE_PATH)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.yaml");
        let config = DatabaseConfig::new(dir.path().join("records.db"));
        config.save(&file).unwrap();
        assert_eq!(DatabaseConfig::load(&file).unwrap(), config);
    }

    #[test]
    fn test_load_missing_file() {
        let err = DatabaseConfig::load("/nonexistent/clinic.yaml").unwrap_err();
        assert!(matches!(err, crate::SqliteError::IoError(_)));
    }

    #[test]
    fn test_load_invalid_yaml() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("db.yaml");
        std::fs::write(&file, "path: [unclosed").unwrap();
        let err = DatabaseConfig::load(&file).unwrap_err();
        assert!(matches!(err, crate::SqliteError::ConfigError(_)));
    }
}
