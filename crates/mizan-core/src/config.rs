//! Configuration module for Mizan.
//!
//! Provides typed configuration structs that map to the YAML configuration
//! file, with loading, validation and defaults.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Config struct with sub-sections
// ---------------------------------------------------------------------------

/// Top-level configuration for Mizan.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    pub sync: SyncConfig,
    pub drive: DriveConfig,
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    pub export: ExportConfig,
}

/// Synchronization settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Milliseconds of quiet time after an edit before the auto-upload fires.
    pub debounce_delay_ms: u64,
    /// Fixed name of the ledger file in the remote application-data scope.
    pub remote_file_name: String,
}

/// Remote store endpoints. Overridable for testing against a mock server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DriveConfig {
    /// Base URL for metadata/content requests (`/files`, `/files/{id}`).
    pub api_base_url: String,
    /// Base URL for upload requests (`uploadType=multipart|media`).
    pub upload_base_url: String,
}

/// Local persistence settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    pub db_path: PathBuf,
}

/// Logging / tracing settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: `trace`, `debug`, `info`, `warn`, or `error`.
    pub level: String,
}

/// Export document settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExportConfig {
    /// Language tag recorded in export files (`en` or `ar`).
    pub language: String,
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

impl Config {
    /// Load configuration from a YAML file at `path`.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Try to load from `path`; fall back to [`Config::default`] on any error.
    pub fn load_or_default(path: &Path) -> Self {
        Self::load(path).unwrap_or_default()
    }

    /// Platform-appropriate default path for the configuration file.
    ///
    /// Typically `$XDG_CONFIG_HOME/mizan/config.yaml` on Linux.
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("~/.config"))
            .join("mizan")
            .join("config.yaml")
    }
}

// ---------------------------------------------------------------------------
// Defaults
// ---------------------------------------------------------------------------

// Config derives Default because all its fields implement Default.

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            debounce_delay_ms: 3000,
            remote_file_name: "mizan-ledger.json".to_string(),
        }
    }
}

impl Default for DriveConfig {
    fn default() -> Self {
        Self {
            api_base_url: "https://www.googleapis.com/drive/v3".to_string(),
            upload_base_url: "https://www.googleapis.com/upload/drive/v3".to_string(),
        }
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            db_path: dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from("~/.local/share"))
                .join("mizan")
                .join("mizan.db"),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            language: "en".to_string(),
        }
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// A single validation error found in the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Dotted path to the offending field, e.g. `"sync.debounce_delay_ms"`.
    pub field: String,
    /// Human-readable explanation.
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Valid values for `logging.level`.
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid values for `export.language`.
const VALID_LANGUAGES: &[&str] = &["en", "ar"];

impl Config {
    /// Validate the configuration and return all errors found.
    ///
    /// An empty vector means the configuration is valid.
    pub fn validate(&self) -> Vec<ValidationError> {
        let mut errors = Vec::new();

        // --- sync ---
        if self.sync.debounce_delay_ms == 0 {
            errors.push(ValidationError {
                field: "sync.debounce_delay_ms".into(),
                message: "must be greater than 0".into(),
            });
        }
        if self.sync.remote_file_name.trim().is_empty() {
            errors.push(ValidationError {
                field: "sync.remote_file_name".into(),
                message: "must not be empty".into(),
            });
        }
        if self.sync.remote_file_name.contains('\'') {
            errors.push(ValidationError {
                field: "sync.remote_file_name".into(),
                message: "must not contain single quotes".into(),
            });
        }

        // --- drive ---
        for (field, value) in [
            ("drive.api_base_url", &self.drive.api_base_url),
            ("drive.upload_base_url", &self.drive.upload_base_url),
        ] {
            if !value.starts_with("http://") && !value.starts_with("https://") {
                errors.push(ValidationError {
                    field: field.into(),
                    message: format!("must be an http(s) URL, got '{}'", value),
                });
            }
        }

        // --- logging ---
        if !VALID_LOG_LEVELS.contains(&self.logging.level.as_str()) {
            errors.push(ValidationError {
                field: "logging.level".into(),
                message: format!(
                    "invalid level '{}'; valid options: {}",
                    self.logging.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        // --- export ---
        if !VALID_LANGUAGES.contains(&self.export.language.as_str()) {
            errors.push(ValidationError {
                field: "export.language".into(),
                message: format!(
                    "invalid language '{}'; valid options: {}",
                    self.export.language,
                    VALID_LANGUAGES.join(", ")
                ),
            });
        }

        errors
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
