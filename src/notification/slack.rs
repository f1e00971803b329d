//! A notifier that posts to a Slack incoming webhook.

use crate::config::SlackConfig;
use crate::core::{Attachment, Message, Notifier, Priority};
use crate::error::NotificationError;
use crate::notification::http::{build_client, merge_metadata, post_json};
use async_trait::async_trait;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// A client for sending messages to a Slack webhook.
pub struct SlackNotifier {
    name: String,
    webhook_url: String,
    default_channel: Option<String>,
    username: Option<String>,
    client: reqwest::Client,
}

impl SlackNotifier {
    /// Creates a new `SlackNotifier`. Fails if the webhook URL is empty.
    pub fn new(config: &SlackConfig) -> Result<Self, NotificationError> {
        if config.webhook_url.trim().is_empty() {
            return Err(NotificationError::config(&config.name, "webhook_url is empty"));
        }
        let client = build_client(&config.name, Duration::from_secs(config.timeout_seconds))?;

        Ok(Self {
            name: config.name.clone(),
            webhook_url: config.webhook_url.clone(),
            default_channel: config.default_channel.clone(),
            username: config.username.clone(),
            client,
        })
    }

    /// Adds the destination and display name to a payload.
    fn addressed(&self, mut payload: Value, channel: Option<&str>) -> Value {
        if let Some(channel) = channel.or(self.default_channel.as_deref()) {
            payload["channel"] = json!(channel);
        }
        if let Some(username) = &self.username {
            payload["username"] = json!(username);
        }
        payload
    }

    fn text_payload(&self, text: &str) -> Value {
        self.addressed(json!({ "text": text }), None)
    }

    fn message_payload(&self, message: &Message) -> Value {
        let mut text = String::new();
        if message.priority == Some(Priority::High) {
            text.push_str(":rotating_light: ");
        }
        if let Some(title) = &message.title {
            text.push_str(&format!("*{}*\n", title));
        }
        text.push_str(&message.text);

        let mut payload = self.addressed(json!({ "text": text }), message.channel.as_deref());
        if !message.attachments.is_empty() {
            payload["attachments"] = message.attachments.iter().map(attachment_json).collect();
        }
        merge_metadata(&mut payload, &message.metadata);
        payload
    }

    fn rich_payload(&self, channel: Option<&str>, blocks: &Value) -> Value {
        self.addressed(json!({ "blocks": blocks }), channel)
    }

    async fn post(
        &self,
        cancel: &CancellationToken,
        payload: &Value,
    ) -> Result<(), NotificationError> {
        post_json(&self.client, &self.name, &self.webhook_url, payload, cancel).await?;
        info!(provider = %self.name, "Successfully sent message to Slack.");
        Ok(())
    }
}

fn attachment_json(attachment: &Attachment) -> Value {
    let fields: Vec<Value> = attachment
        .fields
        .iter()
        .map(|f| json!({ "title": f.title, "value": f.value, "short": f.short }))
        .collect();

    let mut value = json!({ "title": attachment.title, "fields": fields });
    if let Some(color) = &attachment.color {
        value["color"] = json!(color);
    }
    value
}

#[async_trait]
impl Notifier for SlackNotifier {
    fn name(&self) -> &str {
        &self.name
    }

    #[instrument(skip_all, fields(provider = %self.name))]
    async fn send(&self, cancel: &CancellationToken, text: &str) -> anyhow::Result<()> {
        self.post(cancel, &self.text_payload(text)).await?;
        Ok(())
    }

    #[instrument(skip_all, fields(provider = %self.name))]
    async fn send_with_options(
        &self,
        cancel: &CancellationToken,
        message: &Message,
    ) -> anyhow::Result<()> {
        self.post(cancel, &self.message_payload(message)).await?;
        Ok(())
    }

    /// Posts `blocks` as the Block Kit `blocks` array of the webhook payload.
    #[instrument(skip_all, fields(provider = %self.name))]
    async fn send_rich(
        &self,
        cancel: &CancellationToken,
        channel: Option<&str>,
        blocks: &Value,
    ) -> anyhow::Result<()> {
        self.post(cancel, &self.rich_payload(channel, blocks)).await?;
        Ok(())
    }
}
