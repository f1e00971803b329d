//! A notifier that talks to the Telegram Bot API `sendMessage` method.

use crate::config::TelegramConfig;
use crate::core::{Message, Notifier, Priority};
use crate::error::NotificationError;
use crate::notification::http::{build_client, merge_metadata, post_json};
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, instrument};

/// The envelope every Bot API answer is wrapped in.
#[derive(Debug, Deserialize)]
struct ApiResponse {
    ok: bool,
    #[serde(default)]
    description: Option<String>,
}

pub struct TelegramNotifier {
    name: String,
    chat_id: String,
    endpoint: String,
    client: reqwest::Client,
}

impl TelegramNotifier {
    /// Creates a new `TelegramNotifier`. Fails if the token or chat id is empty.
    pub fn new(config: &TelegramConfig) -> Result<Self, NotificationError> {
        if config.bot_token.trim().is_empty() {
            return Err(NotificationError::config(&config.name, "bot_token is empty"));
        }
        if config.chat_id.trim().is_empty() {
            return Err(NotificationError::config(&config.name, "chat_id is empty"));
        }
        let client = build_client(&config.name, Duration::from_secs(config.timeout_seconds))?;

        Ok(Self {
            name: config.name.clone(),
            chat_id: config.chat_id.clone(),
            endpoint: format!(
                "{}/bot{}/sendMessage",
                config.api_base_url.trim_end_matches('/'),
                config.bot_token
            ),
            client,
        })
    }

    fn text_payload(&self, text: &str) -> Value {
        json!({ "chat_id": self.chat_id, "text": text })
    }

    fn message_payload(&self, message: &Message) -> Value {
        let mut text = String::new();
        if message.priority == Some(Priority::High) {
            text.push_str("[HIGH] ");
        }
        if let Some(title) = &message.title {
            text.push_str(title);
            text.push_str("\n\n");
        }
        text.push_str(&message.text);

        for attachment in &message.attachments {
            text.push_str("\n\n");
            text.push_str(&attachment.title);
            for field in &attachment.fields {
                text.push_str(&format!("\n{}: {}", field.title, field.value));
            }
        }

        let chat_id = message.channel.as_deref().unwrap_or(&self.chat_id);
        let mut payload = json!({ "chat_id": chat_id, "text": text });
        if message.priority == Some(Priority::Low) {
            payload["disable_notification"] = json!(true);
        }
        merge_metadata(&mut payload, &message.metadata);
        payload
    }

    fn rich_payload(&self, channel: Option<&str>, blocks: &Value) -> Value {
        let chat_id = channel.unwrap_or(&self.chat_id);
        json!({ "chat_id": chat_id, "text": render_blocks(blocks) })
    }

    async fn post(
        &self,
        cancel: &CancellationToken,
        payload: &Value,
    ) -> Result<(), NotificationError> {
        let body = post_json(&self.client, &self.name, &self.endpoint, payload, cancel).await?;

        // A 2xx answer can still carry `"ok": false`.
        match serde_json::from_str::<ApiResponse>(&body) {
            Ok(ApiResponse { ok: true, .. }) => {
                info!(provider = %self.name, "Successfully sent message to Telegram.");
                Ok(())
            }
            Ok(ApiResponse { description, .. }) => Err(NotificationError::delivery(
                &self.name,
                format!(
                    "telegram api error: {}",
                    description.unwrap_or_else(|| "unknown error".to_string())
                ),
            )),
            Err(e) => Err(
                NotificationError::delivery(&self.name, "malformed telegram response")
                    .with_source(e),
            ),
        }
    }
}

/// Renders rich content as message text.
///
/// An array becomes one line per element, a string is used as is, and any
/// other JSON value is sent in its compact serialized form.
fn render_blocks(blocks: &Value) -> String {
    match blocks {
        Value::String(text) => text.clone(),
        Value::Array(lines) => lines
            .iter()
            .map(|line| match line {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
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
