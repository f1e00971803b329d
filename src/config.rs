//! Configuration management for multinotify
//!
//! This module defines the main `Config` struct and the per-backend
//! sections. It uses the `figment` crate to layer defaults, a
//! `multinotify.toml` file, environment variables and command-line
//! overrides.

use crate::cli::Cli;
use anyhow::Result;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file looked up in the working directory when `--config` is absent.
pub const DEFAULT_CONFIG_FILE: &str = "multinotify.toml";

/// The main configuration struct for the application.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct Config {
    /// The logging level for the application.
    pub log_level: String,
    /// Slack incoming-webhook backend.
    #[serde(default)]
    pub slack: Option<SlackConfig>,
    /// Telegram Bot API backend.
    #[serde(default)]
    pub telegram: Option<TelegramConfig>,
    /// Backend that writes notifications to the application log.
    #[serde(default)]
    pub log: Option<LogConfig>,
}

/// Configuration for Slack notifications.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct SlackConfig {
    /// Name the backend is registered under.
    #[serde(default = "default_slack_name")]
    pub name: String,
    /// The Slack incoming webhook URL.
    pub webhook_url: String,
    /// Channel used when a message does not override it.
    #[serde(default)]
    pub default_channel: Option<String>,
    /// Display name for posted messages.
    #[serde(default)]
    pub username: Option<String>,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Configuration for Telegram notifications.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct TelegramConfig {
    /// Name the backend is registered under.
    #[serde(default = "default_telegram_name")]
    pub name: String,
    /// Token issued by BotFather.
    pub bot_token: String,
    /// Target chat, as a numeric id or `@channelusername`.
    pub chat_id: String,
    /// Base URL of the Bot API.
    #[serde(default = "default_telegram_api")]
    pub api_base_url: String,
    /// HTTP request timeout in seconds.
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

/// Configuration for the log backend.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct LogConfig {
    #[serde(default = "default_log_name")]
    pub name: String,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            name: default_log_name(),
        }
    }
}

fn default_slack_name() -> String {
    "slack".to_string()
}

fn default_telegram_name() -> String {
    "telegram".to_string()
}

fn default_log_name() -> String {
    "log".to_string()
}

fn default_telegram_api() -> String {
    "https://api.telegram.org".to_string()
}

fn default_timeout_seconds() -> u64 {
    10
}

impl SlackConfig {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            name: default_slack_name(),
            webhook_url: webhook_url.into(),
            default_channel: None,
            username: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl TelegramConfig {
    pub fn new(bot_token: impl Into<String>, chat_id: impl Into<String>) -> Self {
        Self {
            name: default_telegram_name(),
            bot_token: bot_token.into(),
            chat_id: chat_id.into(),
            api_base_url: default_telegram_api(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl Config {
    /// Loads the configuration by layering defaults, the config file,
    /// `MULTINOTIFY_`-prefixed environment variables and the CLI.
    pub fn load(cli: &Cli) -> Result<Self> {
        let config_path = cli
            .config
            .clone()
            .unwrap_or_else(|| DEFAULT_CONFIG_FILE.into());
        let config: Config = Self::figment(&config_path).merge(cli.clone()).extract()?;
        Ok(config)
    }

    /// Loads the configuration from a file and the environment only.
    pub fn load_from_path(config_path: impl AsRef<Path>) -> Result<Self> {
        let config: Config = Self::figment(config_path.as_ref()).extract()?;
        Ok(config)
    }

    fn figment(config_path: &Path) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            // e.g. MULTINOTIFY_SLACK__WEBHOOK_URL=https://hooks.slack.com/...
            .merge(Env::prefixed("MULTINOTIFY_").split("__"))
    }

    /// Returns `true` if no backend section is present.
    pub fn has_no_backends(&self) -> bool {
        self.slack.is_none() && self.telegram.is_none() && self.log.is_none()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            slack: None,
            telegram: None,
            log: None,
        }
    }
}
