//! Client configuration.
//!
//! Defines the YAML-serializable settings for the interactive client. Every
//! field has a default, so an empty file (or no file at all) is valid.
//!
//! # Example YAML
//!
//! ```yaml
//! database: /var/lib/closetly/closetly.db
//! debug: false
//! ```

use std::io::BufWriter;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default database file, relative to the working directory.
pub const DEFAULT_DATABASE: &str = "closetly.db";

/// Client settings.
///
/// # Examples
///
/// ```
/// use closetly_db::ClosetConfig;
///
/// let config = ClosetConfig::from_yaml_str("debug: true\n").unwrap();
/// assert!(config.debug);
/// assert_eq!(config.database.to_str(), Some("closetly.db"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClosetConfig {
    /// Path to the SQLite database file.
    pub database: PathBuf,
    /// Surface detailed connection errors instead of a generic message.
    pub debug: bool,
}

impl Default for ClosetConfig {
    fn default() -> Self {
        Self {
            database: PathBuf::from(DEFAULT_DATABASE),
            debug: false,
        }
    }
}

impl ClosetConfig {
    /// Loads configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns [`IoError`](crate::ConfigError::IoError) if the file cannot
    /// be read, or [`YamlError`](crate::ConfigError::YamlError) if parsing
    /// fails.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&raw)
    }

    /// Parses configuration from a YAML string.
    pub fn from_yaml_str(raw: &str) -> Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Saves the configuration as YAML.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let file = std::fs::File::create(path)?;
        let writer = BufWriter::new(file);
        serde_yaml::to_writer(writer, self)?;
        Ok(())
    }

    /// Applies command-line overrides on top of the loaded values.
    ///
    /// `debug` can only be switched on from the command line, never off.
    pub fn with_overrides(mut self, database: Option<PathBuf>, debug: bool) -> Self {
        if let Some(database) = database {
            self.database = database;
        }
        self.debug |= debug;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_yaml_is_default() {
        assert_eq!(ClosetConfig::from_yaml_str("").unwrap(), ClosetConfig::default());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ClosetConfig::from_yaml_str("database: other.db\n").unwrap();
        assert_eq!(config.database, PathBuf::from("other.db"));
        assert!(!config.debug);
    }

    #[test]
    fn test_overrides() {
        let config = ClosetConfig::default().with_overrides(Some("x.db".into()), true);
        assert_eq!(config.database, PathBuf::from("x.db"));
        assert!(config.debug);

        let config = config.with_overrides(None, false);
        assert!(config.debug);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("closetly.yml");
        let config = ClosetConfig {
            database: "shop.db".into(),
            debug: true,
        };
        config.save(&path).unwrap();
        assert_eq!(ClosetConfig::load(&path).unwrap(), config);
    }

    #[test]
    fn test_unknown_yaml_is_error() {
        assert!(ClosetConfig::from_yaml_str("debug: [not, a, bool]").is_err());
    }
}
