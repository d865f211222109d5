//! Configuration loading and management
//!
//! Handles parsing of `config.toml` / `.pms.toml` configuration files.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::{Error, Result};
use crate::role::Role;

pub const CONFIG_FILE: &str = "config.toml";
pub const LOCAL_CONFIG_FILE: &str = ".pms.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend connection settings
    #[serde(default)]
    pub api: ApiConfig,

    /// Session defaults
    #[serde(default)]
    pub session: SessionConfig,

    /// Assistant behaviour
    #[serde(default)]
    pub assistant: AssistantConfig,

    /// Terminal UI settings
    #[serde(default)]
    pub ui: UiConfig,
}

/// Backend connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Base URL of the REST API, including the `/api` prefix
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Skip the health probe and serve sample data only
    #[serde(default)]
    pub offline: bool,

    #[serde(default = "default_health_timeout_ms")]
    pub health_timeout_ms: u64,

    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,

    #[serde(default = "default_chat_timeout_ms")]
    pub chat_timeout_ms: u64,

    /// Artificial latency applied to sample data responses
    #[serde(default = "default_mock_delay_ms")]
    pub mock_delay_ms: u64,
}

fn default_base_url() -> String {
    "http://localhost:3001/api".to_string()
}

fn default_health_timeout_ms() -> u64 {
    3_000
}

fn default_request_timeout_ms() -> u64 {
    10_000
}

fn default_chat_timeout_ms() -> u64 {
    120_000
}

fn default_mock_delay_ms() -> u64 {
    300
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            offline: false,
            health_timeout_ms: default_health_timeout_ms(),
            request_timeout_ms: default_request_timeout_ms(),
            chat_timeout_ms: default_chat_timeout_ms(),
            mock_delay_ms: default_mock_delay_ms(),
        }
    }
}

impl ApiConfig {
    pub fn health_timeout(&self) -> Duration {
        Duration::from_millis(self.health_timeout_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn chat_timeout(&self) -> Duration {
        Duration::from_millis(self.chat_timeout_ms)
    }

    pub fn mock_delay(&self) -> Duration {
        Duration::from_millis(self.mock_delay_ms)
    }

    fn validate(&self) -> Result<()> {
        let url = self.base_url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(Error::InvalidConfig(format!(
                "api.base_url must start with http:// or https:// (got '{url}')"
            )));
        }
        for (field, value) in [
            ("api.health_timeout_ms", self.health_timeout_ms),
            ("api.request_timeout_ms", self.request_timeout_ms),
            ("api.chat_timeout_ms", self.chat_timeout_ms),
        ] {
            if value == 0 {
                return Err(Error::InvalidConfig(format!("{field} must be > 0")));
            }
        }
        Ok(())
    }
}

/// Session defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionConfig {
    /// Role used when nothing else selects one
    #[serde(default = "default_role")]
    pub default_role: String,
}

fn default_role() -> String {
    "pm".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            default_role: default_role(),
        }
    }
}

impl SessionConfig {
    pub fn role(&self) -> Result<Role> {
        self.default_role
            .parse()
            .map_err(|_| Error::InvalidConfig(format!(
                "session.default_role: unknown role '{}'",
                self.default_role
            )))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssistantConfig {
    /// Typing delay before a canned reply is shown
    #[serde(default = "default_reply_delay_ms")]
    pub reply_delay_ms: u64,
}

fn default_reply_delay_ms() -> u64 {
    1_500
}

impl Default for AssistantConfig {
    fn default() -> Self {
        Self {
            reply_delay_ms: default_reply_delay_ms(),
        }
    }
}

impl AssistantConfig {
    pub fn reply_delay(&self) -> Duration {
        Duration::from_millis(self.reply_delay_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    /// Event poll interval of the terminal UI
    #[serde(default = "default_tick_ms")]
    pub tick_ms: u64,
}

fn default_tick_ms() -> u64 {
    200
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            tick_ms: default_tick_ms(),
        }
    }
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Resolve the config file: an explicit path must exist, otherwise the
    /// state dir file, then `./.pms.toml`, then defaults.
    pub fn discover(explicit: Option<&Path>, state_dir: &Path, cwd: &Path) -> Result<Self> {
        if let Some(path) = explicit {
            if !path.exists() {
                return Err(Error::InvalidConfig(format!(
                    "config file not found: {}",
                    path.display()
                )));
            }
            return Self::load(path);
        }
        for candidate in Self::candidates(state_dir, cwd) {
            if candidate.exists() {
                tracing::debug!(path = %candidate.display(), "loading config");
                return Self::load(&candidate);
            }
        }
        Ok(Self::default())
    }

    fn candidates(state_dir: &Path, cwd: &Path) -> [PathBuf; 2] {
        [state_dir.join(CONFIG_FILE), cwd.join(LOCAL_CONFIG_FILE)]
    }

    /// Save configuration to a file
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Replace the API base URL (from `--api-url` / `PMS_API_URL`).
    pub fn with_api_url(mut self, url: Option<&str>) -> Result<Self> {
        if let Some(url) = url {
            self.api.base_url = url.trim().trim_end_matches('/').to_string();
            self.api.validate()?;
        }
        Ok(self)
    }

    fn validate(&self) -> Result<()> {
        self.api.validate()?;
        self.session.role()?;
        if self.ui.tick_ms == 0 {
            return Err(Error::InvalidConfig("ui.tick_ms must be > 0".to_string()));
        }
        Ok(())
    }
}
