//! Configuration for the forum-tags tooling.
//!
//! Loaded from TOML (explicit path, else `~/.forum-tags/config.toml`), then
//! overridden by `FORUM_TAGS_DB` and `FORUM_TAGS_TAXONOMY`.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use forum_tags::DEFAULT_PAGE_SIZE;

pub const DB_ENV: &str = "FORUM_TAGS_DB";
pub const TAXONOMY_ENV: &str = "FORUM_TAGS_TAXONOMY";

/// Errors loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error reading {path}: {message}")]
    Io { path: String, message: String },

    #[error("Parse error in {path}: {message}")]
    Parse { path: String, message: String },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForumConfig {
    /// SQLite database holding tags and posts
    pub database_path: PathBuf,
    /// Source name tree (nested JSON object) used by `seed`
    pub taxonomy_path: PathBuf,
    /// Content items per page
    pub page_size: u32,
    /// Default tracing filter when `RUST_LOG` is unset
    pub log_filter: String,
}

impl Default for ForumConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from("forum.db"),
            taxonomy_path: PathBuf::from("data/tags.json"),
            page_size: DEFAULT_PAGE_SIZE,
            log_filter: "info".to_string(),
        }
    }
}

impl ForumConfig {
    /// Parse a TOML file. Missing keys fall back to defaults.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        toml::from_str(&content).map_err(|e| ConfigError::Parse {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// The per-user config location, if a home directory is known.
    pub fn user_config_path() -> Option<PathBuf> {
        dirs::home_dir().map(|home| home.join(".forum-tags").join("config.toml"))
    }

    /// Load from `explicit`, else the user config if present, else defaults;
    /// then apply environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::user_config_path().filter(|p| p.exists()) {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Apply overrides from a key lookup (the environment, in production).
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(db) = lookup(DB_ENV) {
            self.database_path = PathBuf::from(db);
        }
        if let Some(taxonomy) = lookup(TAXONOMY_ENV) {
            self.taxonomy_path = PathBuf::from(taxonomy);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn partial_file_uses_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_path = \"/var/lib/forum/forum.db\"\npage_size = 50").unwrap();

        let config = ForumConfig::from_file(file.path()).unwrap();
        assert_eq!(config.database_path, PathBuf::from("/var/lib/forum/forum.db"));
        assert_eq!(config.page_size, 50);
        assert_eq!(config.taxonomy_path, PathBuf::from("data/tags.json"));
        assert_eq!(config.log_filter, "info");
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "page_size = \"many\"").unwrap();
        assert!(matches!(
            ForumConfig::from_file(file.path()),
            Err(ConfigError::Parse { .. })
        ));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            ForumConfig::from_file(&dir.path().join("absent.toml")),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn overrides_replace_paths() {
        let mut config = ForumConfig::default();
        config.apply_overrides(|key| match key {
            DB_ENV => Some("/tmp/other.db".to_string()),
            _ => None,
        });
        assert_eq!(config.database_path, PathBuf::from("/tmp/other.db"));
        assert_eq!(config.taxonomy_path, PathBuf::from("data/tags.json"));
    }
}
