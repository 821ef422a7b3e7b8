//! Configuration from `mysqlite.toml`.
//!
//! ```toml
//! debug = false
//! fetch_mode = "assoc"
//!
//! [database]
//! path = "wordpress.sqlite"
//! name = "wp"
//! journal_mode = "wal"
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;

use crate::engine::FetchMode;
use crate::error::{Error, Result};

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "mysqlite.toml";

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Return failures as `Err` instead of a failed result.
    pub debug: bool,
    pub fetch_mode: FetchMode,
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DatabaseConfig {
    /// SQLite file, or `:memory:`.
    pub path: String,
    /// MySQL schema name reported by the catalog and `DATABASE()`.
    pub name: String,
    pub journal_mode: Option<String>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: ":memory:".to_string(),
            name: "wp".to_string(),
            journal_mode: None,
        }
    }
}

impl Config {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }

    /// `./mysqlite.toml`, then the user config directory, then defaults.
    pub fn discover() -> Result<Self> {
        match Self::candidates().into_iter().find(|path| path.is_file()) {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    fn candidates() -> Vec<PathBuf> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE)];
        if let Some(dir) = dirs::config_dir() {
            candidates.push(dir.join("mysqlite").join("config.toml"));
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn test_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.database.path, ":memory:");
        assert_eq!(config.database.name, "wp");
        assert_eq!(config.fetch_mode, FetchMode::Assoc);
        assert!(!config.debug);
    }

    #[test]
    fn test_full_config() {
        let config = Config::from_toml_str(
            r#"
            debug = true
            fetch_mode = "num"

            [database]
            path = "wordpress.sqlite"
            name = "blog"
            journal_mode = "wal"
            "#,
        )
        .unwrap();
        assert!(config.debug);
        assert_eq!(config.fetch_mode, FetchMode::Num);
        assert_eq!(config.database.path, "wordpress.sqlite");
        assert_eq!(config.database.name, "blog");
        assert_eq!(config.database.journal_mode.as_deref(), Some("wal"));
    }

    #[test]
    fn test_invalid_config() {
        assert!(matches!(
            Config::from_toml_str("fetch_mode = \"both\""),
            Err(Error::Config(_))
        ));
        assert!(matches!(
            Config::from_toml_str("[database]\nport = 3306"),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_load_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[database]\nname = \"shop\"").unwrap();
        let config = Config::load(file.path()).unwrap();
        assert_eq!(config.database.name, "shop");
        assert_eq!(config.database.path, ":memory:");

        assert!(matches!(Config::load("/nonexistent/mysqlite.toml"), Err(Error::Io(_))));
    }
}
