//! Encapsulation for setting up the bundled notification backends.

use crate::{
    config::{Config, LogConfig, SlackConfig, TelegramConfig},
    core::Notifier,
    error::NotificationError,
    notification::{LogNotifier, Manager, SlackNotifier, TelegramNotifier},
};
use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

/// A backend description that can be turned into a registered notifier.
pub enum Backend {
    Slack(SlackConfig),
    Telegram(TelegramConfig),
    Log(LogConfig),
    /// An already constructed notifier.
    Custom(Arc<dyn Notifier>),
}

impl Backend {
    /// Constructs the notifier, validating its configuration.
    pub fn into_notifier(self) -> Result<Arc<dyn Notifier>, NotificationError> {
        let notifier: Arc<dyn Notifier> = match self {
            Backend::Slack(config) => Arc::new(SlackNotifier::new(&config)?),
            Backend::Telegram(config) => Arc::new(TelegramNotifier::new(&config)?),
            Backend::Log(config) => Arc::new(LogNotifier::new(&config)),
            Backend::Custom(notifier) => notifier,
        };
        Ok(notifier)
    }
}

impl From<SlackConfig> for Backend {
    fn from(config: SlackConfig) -> Self {
        Backend::Slack(config)
    }
}

impl From<TelegramConfig> for Backend {
    fn from(config: TelegramConfig) -> Self {
        Backend::Telegram(config)
    }
}

impl From<LogConfig> for Backend {
    fn from(config: LogConfig) -> Self {
        Backend::Log(config)
    }
}

impl From<Arc<dyn Notifier>> for Backend {
    fn from(notifier: Arc<dyn Notifier>) -> Self {
        Backend::Custom(notifier)
    }
}

/// Lists the backends enabled by the configuration.
pub fn backends_from_config(config: &Config) -> Vec<Backend> {
    let mut backends = Vec::new();
    if let Some(slack) = &config.slack {
        backends.push(Backend::Slack(slack.clone()));
    }
    if let Some(telegram) = &config.telegram {
        backends.push(Backend::Telegram(telegram.clone()));
    }
    if let Some(log) = &config.log {
        backends.push(Backend::Log(log.clone()));
    }
    backends
}

/// Constructs and registers each backend, stopping at the first failure.
pub fn register_backends(
    manager: &Manager,
    backends: impl IntoIterator<Item = Backend>,
) -> Result<(), NotificationError> {
    for backend in backends {
        let notifier = backend.into_notifier()?;
        info!(provider = %notifier.name(), "Notifier enabled.");
        manager.register(notifier)?;
    }
    Ok(())
}

/// Builds a `Manager` holding every backend enabled in the configuration.
pub fn build_manager(config: &Config) -> Result<Manager> {
    let manager = Manager::new();
    register_backends(&manager, backends_from_config(config))
        .context("failed to set up notifiers")?;
    Ok(manager)
}
