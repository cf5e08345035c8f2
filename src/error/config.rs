//! Configuration error types.

use std::fmt;
use std::path::PathBuf;

/// Configuration-specific error variants.
///
/// All of these are fatal to the operation that hit them and are never
/// retried; the user has to fix the configuration first.
#[derive(Debug, Clone, PartialEq)]
pub enum ConfigError {
    /// No developer token was configured (or it was blank).
    MissingDeveloperToken,

    /// A configuration field holds an unusable value.
    InvalidValue { field: String, message: String },

    /// The configuration file exists but could not be read or parsed.
    LoadFailed { path: PathBuf, message: String },

    /// The configuration file could not be written.
    SaveFailed { path: PathBuf, message: String },
}

impl ConfigError {
    /// Get a user-friendly error message.
    pub fn user_message(&self) -> String {
        match self {
            ConfigError::MissingDeveloperToken => {
                "No developer token is configured. Set MUSICLINK_DEVELOPER_TOKEN or add it to the config file.".to_string()
            }
            ConfigError::InvalidValue { field, message } => {
                format!("Invalid value for '{}': {}", field, message)
            }
            ConfigError::LoadFailed { path, .. } => {
                format!("Could not read configuration from '{}'.", path.display())
            }
            ConfigError::SaveFailed { path, .. } => {
                format!("Could not write configuration to '{}'.", path.display())
            }
        }
    }

    /// Get a short error code for logging.
    pub fn error_code(&self) -> &'static str {
        match self {
            ConfigError::MissingDeveloperToken => "E_CFG_DEV_TOKEN",
            ConfigError::InvalidValue { .. } => "E_CFG_INVALID",
            ConfigError::LoadFailed { .. } => "E_CFG_LOAD",
            ConfigError::SaveFailed { .. } => "E_CFG_SAVE",
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::MissingDeveloperToken => write!(f, "Developer token is missing"),
            ConfigError::InvalidValue { field, message } => {
                write!(f, "Invalid config value '{}': {}", field, message)
            }
            ConfigError::LoadFailed { path, message } => {
                write!(f, "Failed to load config '{}': {}", path.display(), message)
            }
            ConfigError::SaveFailed { path, message } => {
                write!(f, "Failed to save config '{}': {}", path.display(), message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}
