//! A notifier that writes every message to the application log.
//!
//! Useful as a console backend while wiring up an application, and as a
//! baseline for validating the dispatch pipeline.

use crate::config::LogConfig;
use crate::core::{Message, Notifier};
use crate::error::NotificationError;
use async_trait::async_trait;
use serde_json::Value;
use tokio_util::sync::CancellationToken;
use tracing::info;

pub struct LogNotifier {
    name: String,
}

impl LogNotifier {
    pub fn new(config: &LogConfig) -> Self {
        Self {
            name: config.name.clone(),
        }
    }

    fn ensure_active(&self, cancel: &CancellationToken) -> Result<(), NotificationError> {
        if cancel.is_cancelled() {
            return Err(NotificationError::cancelled(&self.name));
        }
        Ok(())
    }
}

#[async_trait]
impl Notifier for LogNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    async fn send(&self, cancel: &CancellationToken, text: &str) -> anyhow::Result<()> {
        self.ensure_active(cancel)?;
        info!(provider = %self.name, text, "Notification");
        Ok(())
    }

    async fn send_with_options(
        &self,
        cancel: &CancellationToken,
        message: &Message,
    ) -> anyhow::Result<()> {
        self.ensure_active(cancel)?;
        info!(
            provider = %self.name,
            title = ?message.title,
            priority = ?message.priority.as_ref().map(|p| p.as_str()),
            channel = ?message.channel,
            attachments = message.attachments.len(),
            text = %message.text,
            "Notification"
        );
        Ok(())
    }

    async fn send_rich(
        &self,
        cancel: &CancellationToken,
        channel: Option<&str>,
        blocks: &Value,
    ) -> anyhow::Result<()> {
        self.ensure_active(cancel)?;
        info!(provider = %self.name, channel, blocks = %blocks, "Rich notification");
        Ok(())
    }
}
