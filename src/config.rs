//! Runtime configuration
//!
//! Settings come from a TOML file, then environment variables on top. The file
//! is `$TASK_RELAY_CONFIG` when set, otherwise `<config dir>/task-relay/config.toml`;
//! a missing default file just means defaults.

use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::board::BoardConfig;
use crate::reply::Locale;

pub const CONFIG_PATH_ENV: &str = "TASK_RELAY_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Missing required setting: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {key}: {value}")]
    Invalid { key: &'static str, value: String },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub line: LineConfig,

    #[serde(default)]
    pub board: BoardConfig,

    #[serde(default)]
    pub reply: ReplyConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LineConfig {
    #[serde(default)]
    pub channel_access_token: Option<String>,

    #[serde(default)]
    pub channel_secret: Option<String>,

    #[serde(default = "default_line_api_base")]
    pub api_base: String,

    /// Accept unsigned webhooks and expose the /test routes; local use only
    #[serde(default)]
    pub skip_signature: bool,
}

fn default_line_api_base() -> String {
    "https://api.line.me".to_string()
}

impl Default for LineConfig {
    fn default() -> Self {
        Self {
            channel_access_token: None,
            channel_secret: None,
            api_base: default_line_api_base(),
            skip_signature: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyConfig {
    #[serde(default)]
    pub locale: Locale,
}

/// Where the config file is looked up
pub fn config_path() -> Option<PathBuf> {
    match env::var_os(CONFIG_PATH_ENV) {
        Some(path) if !path.is_empty() => Some(PathBuf::from(path)),
        _ => dirs::config_dir().map(|dir| dir.join("task-relay").join("config.toml")),
    }
}

impl Config {
    /// Load the config file (if any) and apply environment overrides
    pub fn load() -> Result<Self> {
        let explicit = env::var_os(CONFIG_PATH_ENV).is_some_and(|p| !p.is_empty());
        let mut config = match config_path() {
            Some(path) if explicit || path.exists() => Self::from_path(&path)?,
            _ => Self::default(),
        };
        config.apply_env()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        debug!(path = %path.display(), "Loading config");
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_overrides(|key| env::var(key).ok())
    }

    /// Apply overrides from any key lookup; blank values are ignored
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get("LINE_CHANNEL_ACCESS_TOKEN") {
            self.line.channel_access_token = Some(v);
        }
        if let Some(v) = get("LINE_CHANNEL_SECRET") {
            self.line.channel_secret = Some(v);
        }
        if let Some(v) = get("FOCALBOARD_API_URL") {
            self.board.api_url = v;
        }
        if let Some(v) = get("FOCALBOARD_TOKEN") {
            self.board.token = Some(v);
        }
        if let Some(v) = get("FOCALBOARD_TEAM_ID") {
            self.board.team_id = v;
        }
        if let Some(v) = get("FOCALBOARD_DEFAULT_BOARD_ID") {
            self.board.default_board_id = Some(v);
        }
        if let Some(v) = get("PORT") {
            self.server.port = v.trim().parse().map_err(|_| ConfigError::Invalid {
                key: "PORT",
                value: v.clone(),
            })?;
        }
        Ok(())
    }

    /// Check the settings the webhook server cannot run without
    pub fn validate_for_serve(&self) -> Result<()> {
        let is_set = |v: &Option<String>| v.as_deref().is_some_and(|s| !s.trim().is_empty());

        if !self.line.skip_signature {
            if !is_set(&self.line.channel_secret) {
                return Err(ConfigError::Missing("line.channel_secret (LINE_CHANNEL_SECRET)"));
            }
            if !is_set(&self.line.channel_access_token) {
                return Err(ConfigError::Missing(
                    "line.channel_access_token (LINE_CHANNEL_ACCESS_TOKEN)",
                ));
            }
        }
        if !is_set(&self.board.token) && !is_set(&self.board.default_board_id) {
            return Err(ConfigError::Missing(
                "board.token (FOCALBOARD_TOKEN) or board.default_board_id (FOCALBOARD_DEFAULT_BOARD_ID)",
            ));
        }
        Ok(())
    }
}
