//! Client configuration.
//!
//! Values come from three places, later ones winning: built-in defaults,
//! `<data dir>/config.json`, and `MUSICLINK_*` environment variables.
//!
//! # Example
//!
//! ```ignore
//! use musiclink::config::ClientConfig;
//!
//! let config = ClientConfig::default()
//!     .with_developer_token("eyJhbGciOi...")
//!     .with_hide_start_screen(true);
//! ```

use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::auth::request::{
    RequestDefaults, DEFAULT_AFFILIATE_TOKEN, DEFAULT_CAMPAIGN_TOKEN, DEFAULT_CONTEXT_ID,
    DEFAULT_START_SCREEN_MESSAGE,
};
use crate::auth::token::TOKEN_FILE;
use crate::error::{ConfigError, ErrorContext, LinkResult, ResultExt, SystemError};
use crate::traits::ServiceDescriptor;

/// The data directory name under the home directory.
pub const DATA_DIR: &str = ".musiclink";
pub const CONFIG_FILE: &str = "config.json";
pub const LOG_FILE: &str = "musiclink.log";

pub const ENV_DEVELOPER_TOKEN: &str = "MUSICLINK_DEVELOPER_TOKEN";
pub const ENV_SERVICE: &str = "MUSICLINK_SERVICE";
pub const ENV_HOME: &str = "MUSICLINK_HOME";

/// Data directory: `$MUSICLINK_HOME` if set, else `~/.musiclink`.
pub fn default_data_dir() -> Result<PathBuf, SystemError> {
    if let Some(home) = std::env::var_os(ENV_HOME).filter(|v| !v.is_empty()) {
        return Ok(PathBuf::from(home));
    }
    dirs::home_dir()
        .map(|home| home.join(DATA_DIR))
        .ok_or(SystemError::NoHomeDirectory)
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// App credential presented to the authorization surface
    pub developer_token: String,
    /// Browsing service to connect to
    pub service: ServiceDescriptor,
    /// `ct` custom parameter
    pub campaign_token: String,
    /// `at` custom parameter
    pub affiliate_token: String,
    pub context_id: String,
    pub start_screen_message: String,
    pub hide_start_screen: bool,
    /// Loopback service answer delay in milliseconds
    pub connect_delay_ms: u64,
    /// Overrides the default data directory
    #[serde(skip)]
    pub data_dir: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            developer_token: String::new(),
            service: ServiceDescriptor::default(),
            campaign_token: DEFAULT_CAMPAIGN_TOKEN.to_string(),
            affiliate_token: DEFAULT_AFFILIATE_TOKEN.to_string(),
            context_id: DEFAULT_CONTEXT_ID.to_string(),
            start_screen_message: DEFAULT_START_SCREEN_MESSAGE.to_string(),
            hide_start_screen: false,
            connect_delay_ms: 50,
            data_dir: None,
        }
    }
}

impl ClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_developer_token(mut self, token: impl Into<String>) -> Self {
        self.developer_token = token.into();
        self
    }

    pub fn with_service(mut self, service: ServiceDescriptor) -> Self {
        self.service = service;
        self
    }

    pub fn with_context_id(mut self, context_id: impl Into<String>) -> Self {
        self.context_id = context_id.into();
        self
    }

    pub fn with_hide_start_screen(mut self, hide: bool) -> Self {
        self.hide_start_screen = hide;
        self
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    /// Load `<data dir>/config.json` (if present) and apply the environment.
    pub fn load() -> LinkResult<Self> {
        let dir = default_data_dir()?;
        let config = Self::load_from(&dir.join(CONFIG_FILE))
            .and_then(|config| config.apply_env(|key| std::env::var(key).ok()))
            .context(ErrorContext::new("load_config").with_component("config"))?;
        Ok(config)
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let file = File::open(path).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        serde_json::from_reader(BufReader::new(file)).map_err(|e| ConfigError::LoadFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    /// Write to `path`, creating the parent directory if needed.
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|e| save_failed(e.to_string()))?;
        }
        let file = File::create(path).map_err(|e| save_failed(e.to_string()))?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer_pretty(&mut writer, self).map_err(|e| save_failed(e.to_string()))?;
        writer.flush().map_err(|e| save_failed(e.to_string()))
    }

    /// Defaults with `MUSICLINK_*` environment overrides applied.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::default().apply_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`; split out so tests need not touch the
    /// process environment.
    pub fn apply_env<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(token) = lookup(ENV_DEVELOPER_TOKEN) {
            self.developer_token = token;
        }
        if let Some(service) = lookup(ENV_SERVICE) {
            self.service = parse_service(&service)?;
        }
        if let Some(home) = lookup(ENV_HOME).filter(|h| !h.is_empty()) {
            self.data_dir = Some(PathBuf::from(home));
        }
        Ok(self)
    }

    /// Fail early on settings no authorization attempt can succeed with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.developer_token.trim().is_empty() {
            return Err(ConfigError::MissingDeveloperToken);
        }
        Ok(())
    }

    pub fn data_dir(&self) -> Result<PathBuf, SystemError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => default_data_dir(),
        }
    }

    pub fn token_path(&self) -> Result<PathBuf, SystemError> {
        Ok(self.data_dir()?.join(TOKEN_FILE))
    }

    pub fn log_path(&self) -> Result<PathBuf, SystemError> {
        Ok(self.data_dir()?.join(LOG_FILE))
    }

    pub fn connect_delay(&self) -> Duration {
        Duration::from_millis(self.connect_delay_ms)
    }

    pub fn request_defaults(&self) -> RequestDefaults {
        RequestDefaults {
            campaign_token: self.campaign_token.clone(),
            affiliate_token: self.affiliate_token.clone(),
            context_id: self.context_id.clone(),
            start_screen_message: self.start_screen_message.clone(),
            hide_start_screen: self.hide_start_screen,
        }
    }
}

/// Parse `package/class`.
fn parse_service(value: &str) -> Result<ServiceDescriptor, ConfigError> {
    match value.split_once('/') {
        Some((package, class)) if !package.is_empty() && !class.is_empty() => {
            Ok(ServiceDescriptor::new(package, class))
        }
        _ => Err(ConfigError::InvalidValue {
            field: ENV_SERVICE.to_string(),
            message: format!("expected <package>/<class>, got '{}'", value),
        }),
    }
}
