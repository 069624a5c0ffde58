//! Configuration for the metabolic tracker
//!
//! Sources, highest precedence first:
//! 1. CLI arguments (`--data`, `-v`, `-q`)
//! 2. Environment variables (METABOLIC_* prefix)
//! 3. Configuration file (TOML)
//! 4. Default values

use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::healthlog::codec::EXPORT_FILE_NAME;

/// Levels accepted by `[logging] level`
pub const LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Main tracker configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerConfig {
    /// Session defaults
    pub tracker: TrackerSettings,

    /// CSV export settings
    pub export: ExportSettings,

    /// Logging configuration
    pub logging: LoggingSettings,
}

/// Session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackerSettings {
    /// User shown when none is selected
    pub default_user: String,

    /// CSV the session starts from (the built-in sample when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_file: Option<String>,
}

/// CSV export settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportSettings {
    /// File written by `export` when no output is given
    pub file_name: String,
}

/// Logging settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// Log level: trace, debug, info, warn, error
    pub level: String,

    /// Log file path (empty = no file logging)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,

    /// Number of rotated log files to keep
    pub max_files: u32,

    /// Enable JSON formatted logging
    pub json_format: bool,
}

impl Default for TrackerSettings {
    fn default() -> Self {
        Self {
            default_user: "TC".to_string(),
            data_file: None,
        }
    }
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            file_name: EXPORT_FILE_NAME.to_string(),
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            file: None,
            max_files: 5,
            json_format: false,
        }
    }
}

impl TrackerConfig {
    /// Load configuration from file with environment variable overrides
    pub fn load(config_path: Option<&str>) -> Result<Self> {
        let mut config = Self::default();

        // 1. Load from config file if it exists
        if let Some(path) = Self::find_config_file(config_path)? {
            debug!(path = %path.display(), "Loading configuration file");
            let content = fs::read_to_string(&path).map_err(|e| Error::IoRead {
                path: path.clone(),
                source: e,
            })?;
            config = toml::from_str(&content).map_err(|e| Error::ConfigParse {
                message: format!("{}: {}", path.display(), e.message()),
                source: Some(e),
            })?;
            info!(path = %path.display(), "Configuration loaded from file");
        }

        // 2. Apply environment variable overrides
        config.apply_env_overrides();

        // 3. Expand paths
        config.expand_paths();

        // 4. Validate
        config.validate()?;

        Ok(config)
    }

    /// Find the configuration file to use
    fn find_config_file(explicit_path: Option<&str>) -> Result<Option<PathBuf>> {
        // An explicit path must exist
        if let Some(path) = explicit_path {
            let path = PathBuf::from(expand_path(path));
            if path.exists() {
                return Ok(Some(path));
            }
            return Err(Error::config_not_found(path));
        }

        let search_paths = [
            // Current directory
            Some(PathBuf::from("metabolic-tracker.toml")),
            // User config directory
            dirs::config_dir().map(|p| p.join("metabolic-tracker").join("config.toml")),
            // Home directory
            dirs::home_dir().map(|p| p.join(".metabolic-tracker").join("config.toml")),
        ];

        for path in search_paths.iter().flatten() {
            if path.exists() {
                debug!(path = %path.display(), "Found configuration file");
                return Ok(Some(path.clone()));
            }
        }

        debug!("No configuration file found, using defaults");
        Ok(None)
    }

    /// Apply environment variable overrides
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("METABOLIC_DEFAULT_USER") {
            self.tracker.default_user = val;
        }
        if let Ok(val) = std::env::var("METABOLIC_DATA") {
            self.tracker.data_file = Some(val);
        }
        if let Ok(val) = std::env::var("METABOLIC_EXPORT_FILE") {
            self.export.file_name = val;
        }

        if let Ok(val) = std::env::var("METABOLIC_LOG_LEVEL") {
            self.logging.level = val;
        }
        if let Ok(val) = std::env::var("METABOLIC_LOG_FILE") {
            self.logging.file = Some(val);
        }
        if let Ok(val) = std::env::var("METABOLIC_LOG_JSON") {
            self.logging.json_format = val.to_lowercase() == "true" || val == "1";
        }
    }

    /// Expand ~ and environment variables in paths
    fn expand_paths(&mut self) {
        if let Some(ref file) = self.tracker.data_file {
            self.tracker.data_file = Some(expand_path(file));
        }
        if let Some(ref file) = self.logging.file {
            self.logging.file = Some(expand_path(file));
        }
        self.export.file_name = expand_path(&self.export.file_name);
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.tracker.default_user.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "tracker.default_user",
                "default_user cannot be empty",
            ));
        }

        if self.export.file_name.trim().is_empty() {
            return Err(Error::config_field_invalid(
                "export.file_name",
                "file_name cannot be empty",
            ));
        }

        if !LOG_LEVELS.contains(&self.logging.level.to_lowercase().as_str()) {
            return Err(Error::config_field_invalid(
                "logging.level",
                format!(
                    "Invalid log level '{}'. Must be one of: {}",
                    self.logging.level,
                    LOG_LEVELS.join(", ")
                ),
            ));
        }

        Ok(())
    }

    /// The CSV to start sessions from, if one is configured
    pub fn data_file(&self) -> Option<PathBuf> {
        self.tracker
            .data_file
            .as_deref()
            .filter(|f| !f.trim().is_empty())
            .map(PathBuf::from)
    }

    /// Default export destination
    pub fn export_path(&self) -> PathBuf {
        PathBuf::from(&self.export.file_name)
    }
}

/// Expand ~ and environment variables in paths
fn expand_path(path: &str) -> String {
    shellexpand::full(path)
        .unwrap_or_else(|_| std::borrow::Cow::Borrowed(path))
        .into_owned()
}

/// Default location written by `config init`
pub fn default_config_path() -> PathBuf {
    dirs::config_dir()
        .map(|p| p.join("metabolic-tracker"))
        .or_else(|| dirs::home_dir().map(|p| p.join(".metabolic-tracker")))
        .unwrap_or_else(|| PathBuf::from("."))
        .join("config.toml")
}

/// Initialize a new configuration file, returning where it was written
pub fn init_config(path: Option<&str>, force: bool) -> Result<PathBuf> {
    let config_path = path
        .map(|p| PathBuf::from(expand_path(p)))
        .unwrap_or_else(default_config_path);

    if config_path.exists() && !force {
        return Err(Error::Config(format!(
            "Configuration file already exists: {}. Use --force to overwrite.",
            config_path.display()
        )));
    }

    if let Some(parent) = config_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|e| Error::IoWrite {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
    }

    fs::write(&config_path, generate_default_config()).map_err(|e| Error::IoWrite {
        path: config_path.clone(),
        source: e,
    })?;

    info!(path = %config_path.display(), "Configuration file created");
    Ok(config_path)
}

/// Generate default configuration content with comments
fn generate_default_config() -> String {
    r#"# Metabolic Health Tracker Configuration

[tracker]
# User shown when none is selected (falls back to the first user in the log)
default_user = "TC"

# Start sessions from an exported CSV instead of the built-in sample
# data_file = "~/metabolic/data.csv"

[export]
# File written by `export` when --output is not given
file_name = "data.csv"

[logging]
# Log level: trace, debug, info, warn, error
level = "warn"

# Log file path (comment out to disable file logging)
# file = "~/.metabolic-tracker/logs/tracker.log"

# Number of rotated log files to keep
max_files = 5

# Enable JSON formatted logging
json_format = false
"#
    .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = TrackerConfig::default();
        assert_eq!(config.tracker.default_user, "TC");
        assert!(config.tracker.data_file.is_none());
        assert_eq!(config.export.file_name, "data.csv");
        assert_eq!(config.logging.level, "warn");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_override() {
        env::set_var("METABOLIC_DEFAULT_USER", "Theresa");
        env::set_var("METABOLIC_EXPORT_FILE", "theresa.csv");
        env::set_var("METABOLIC_LOG_JSON", "1");

        let mut config = TrackerConfig::default();
        config.apply_env_overrides();

        assert_eq!(config.tracker.default_user, "Theresa");
        assert_eq!(config.export.file_name, "theresa.csv");
        assert!(config.logging.json_format);

        env::remove_var("METABOLIC_DEFAULT_USER");
        env::remove_var("METABOLIC_EXPORT_FILE");
        env::remove_var("METABOLIC_LOG_JSON");
    }

    #[test]
    fn test_validation_empty_user() {
        let mut config = TrackerConfig::default();
        config.tracker.default_user = "  ".to_string();
        assert!(matches!(
            config.validate(),
            Err(Error::ConfigValidation { field: Some(ref f), .. }) if f == "tracker.default_user"
        ));
    }

    #[test]
    fn test_validation_empty_export_name() {
        let mut config = TrackerConfig::default();
        config.export.file_name = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_invalid_log_level() {
        let mut config = TrackerConfig::default();
        config.logging.level = "loud".to_string();
        assert!(config.validate().is_err());

        config.logging.level = "DEBUG".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_path_expansion() {
        let mut config = TrackerConfig::default();
        config.tracker.data_file = Some("~/metabolic/data.csv".to_string());
        config.expand_paths();
        assert!(!config.tracker.data_file.unwrap().contains('~'));
    }

    #[test]
    fn test_blank_data_file_is_unset() {
        let mut config = TrackerConfig::default();
        config.tracker.data_file = Some(String::new());
        assert!(config.data_file().is_none());
    }

    #[test]
    fn test_parse_config_file() {
        let config_str = r#"
[tracker]
default_user = "Theresa"
data_file = "/tmp/log.csv"

[logging]
level = "debug"
"#;

        let config: TrackerConfig = toml::from_str(config_str).unwrap();
        assert_eq!(config.tracker.default_user, "Theresa");
        assert_eq!(config.data_file(), Some(PathBuf::from("/tmp/log.csv")));
        assert_eq!(config.export.file_name, "data.csv");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.max_files, 5);
    }

    #[test]
    fn test_generated_config_parses_to_defaults() {
        let config: TrackerConfig = toml::from_str(&generate_default_config()).unwrap();
        let defaults = TrackerConfig::default();
        assert_eq!(config.tracker.default_user, defaults.tracker.default_user);
        assert_eq!(config.export.file_name, defaults.export.file_name);
        assert_eq!(config.logging.level, defaults.logging.level);
    }

    #[test]
    fn test_explicit_missing_file() {
        assert!(matches!(
            TrackerConfig::find_config_file(Some("/nonexistent/metabolic.toml")),
            Err(Error::ConfigNotFound { .. })
        ));
    }

    #[test]
    fn test_init_refuses_overwrite() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let path_str = path.to_str().unwrap();

        assert_eq!(init_config(Some(path_str), false).unwrap(), path);
        assert!(path.exists());
        assert!(init_config(Some(path_str), false).is_err());
        assert!(init_config(Some(path_str), true).is_ok());
    }
}
