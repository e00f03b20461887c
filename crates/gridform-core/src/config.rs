//! Session configuration.
//!
//! ## Learning: Serde Defaults
//!
//! `#[serde(default)]` on a struct fills every missing field from
//! `Default::default()`, so an empty file and a file with one line are
//! both valid configs.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::grid::Direction;

/// Main configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Form behavior settings
    pub form: FormConfig,

    /// User-facing messages
    pub messages: MessagesConfig,
}

impl Config {
    /// Loads config from the default location, falling back to defaults.
    pub fn load() -> Self {
        match Self::load_from_default_path() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!("Using default config: {}", e);
                Self::default()
            }
        }
    }

    /// Loads config from a file.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    fn load_from_default_path() -> Result<Self, ConfigError> {
        let path = Self::default_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Ok(Self::default())
        }
    }

    /// Returns the default config file path.
    pub fn default_path() -> Result<PathBuf, ConfigError> {
        let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
        Ok(config_dir.join("gridform").join("config.toml"))
    }

    /// Saves the config to the default location.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path()?)
    }

    /// Saves the config to a file, creating parent directories.
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }
}

/// Form behavior configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct FormConfig {
    /// Display direction passed down to child grids
    pub direction: Direction,

    /// Editor components available to custom columns
    pub components: Vec<String>,
}

/// Resource strings shown to the user.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Banner text when saving fails for a reason other than validation
    pub update_error: String,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            update_error: "The record could not be saved.".to_string(),
        }
    }
}

/// Source of localized user-facing messages.
pub trait Strings: Send + Sync {
    /// Generic message for an update that failed unexpectedly.
    fn update_error(&self) -> String;
}

impl Strings for MessagesConfig {
    fn update_error(&self) -> String {
        self.update_error.clone()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config directory not found")]
    NoConfigDir,

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Serialize error: {0}")]
    Serialize(#[from] toml::ser::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.form.direction, Direction::Ltr);
        assert!(config.form.components.is_empty());
        assert!(!config.messages.update_error().is_empty());
    }

    #[test]
    fn test_partial_file() {
        let config: Config = toml::from_str("[form]\ndirection = \"rtl\"\n").unwrap();
        assert_eq!(config.form.direction, Direction::Rtl);
        assert_eq!(
            config.messages.update_error,
            MessagesConfig::default().update_error
        );
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.form.components = vec!["rich_text".to_string()];
        config.messages.update_error = "Nope".to_string();
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.form.components, ["rich_text"]);
        assert_eq!(loaded.messages.update_error(), "Nope");
    }

    #[test]
    fn test_bad_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "form = 3").unwrap();
        assert!(matches!(Config::load_from(&path), Err(ConfigError::Parse(_))));
        assert!(matches!(
            Config::load_from(dir.path().join("missing.toml")),
            Err(ConfigError::Io(_))
        ));
    }
}
