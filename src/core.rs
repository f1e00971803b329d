//! Core domain types and the notifier contract for multinotify
//!
//! This module defines the message value types handed to backends and the
//! trait every notification backend implements.

use crate::error::NotificationError;
use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use tokio_util::sync::CancellationToken;

/// Delivery priority of a message.
///
/// Only `high`, `normal` and `low` are named. Any other string is carried
/// through to backends untouched.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Priority {
    High,
    Normal,
    Low,
    Other(String),
}

impl Priority {
    pub fn as_str(&self) -> &str {
        match self {
            Priority::High => "high",
            Priority::Normal => "normal",
            Priority::Low => "low",
            Priority::Other(value) => value,
        }
    }
}

impl From<String> for Priority {
    fn from(value: String) -> Self {
        match value.as_str() {
            "high" => Priority::High,
            "normal" => Priority::Normal,
            "low" => Priority::Low,
            _ => Priority::Other(value),
        }
    }
}

impl From<&str> for Priority {
    fn from(value: &str) -> Self {
        Priority::from(value.to_string())
    }
}

impl From<Priority> for String {
    fn from(priority: Priority) -> Self {
        priority.as_str().to_string()
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single titled value inside an attachment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Field {
    pub title: String,
    pub value: String,
    /// Display hint: the field is short enough to sit next to another one.
    #[serde(default)]
    pub short: bool,
}

impl Field {
    pub fn new(title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        Self {
            title: title.into(),
            value: value.into(),
            short,
        }
    }
}

/// Structured block attached to a message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Attachment {
    pub title: String,
    /// Accent color, e.g. `"#36a64f"` or `"danger"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default)]
    pub fields: Vec<Field>,
}

impl Attachment {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    pub fn with_field(mut self, field: Field) -> Self {
        self.fields.push(field);
        self
    }
}

/// A message with optional structure, sent through a backend's
/// structured path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Message {
    /// The primary text body.
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub priority: Option<Priority>,
    /// Overrides the backend's default channel or chat.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    #[serde(default)]
    pub attachments: Vec<Attachment>,
    /// Backend-specific extras. Each backend decides what it understands.
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Message {
    /// Creates a message containing only a text body.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_priority(mut self, priority: impl Into<Priority>) -> Self {
        self.priority = Some(priority.into());
        self
    }

    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }

    pub fn with_metadata(
        mut self,
        key: impl Into<String>,
        value: impl Into<serde_json::Value>,
    ) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }
}

/// Outcome of one backend during an asynchronous broadcast.
#[derive(Debug)]
pub struct NotificationResult {
    /// Name of the backend that was attempted.
    pub provider: String,
    pub success: bool,
    /// Set whenever `success` is false.
    pub error: Option<NotificationError>,
}

impl NotificationResult {
    pub fn success(provider: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            success: true,
            error: None,
        }
    }

    pub fn failure(error: NotificationError) -> Self {
        Self {
            provider: error.provider.clone(),
            success: false,
            error: Some(error),
        }
    }

    pub(crate) fn from_outcome(provider: &str, outcome: Result<(), NotificationError>) -> Self {
        match outcome {
            Ok(()) => Self::success(provider),
            Err(e) => Self::failure(e),
        }
    }
}

// =============================================================================
// Service Traits
// =============================================================================

/// A notification backend, such as a chat platform client.
///
/// Implementations must be safe to call concurrently: the manager does not
/// serialize calls to the same backend across dispatches.
#[async_trait]
pub trait Notifier: Send + Sync {
    /// The unique, stable name the backend is registered under
    /// (e.g. "slack", "telegram").
    fn name(&self) -> &str;

    /// Sends a plain text message.
    ///
    /// # Arguments
    /// * `cancel` - Cancelled when the caller no longer wants the result.
    ///   Implementations should stop their I/O promptly once it fires.
    /// * `text` - The message body
    ///
    /// # Returns
    /// * `Ok(())` if the backend accepted the message
    /// * `Err` on transport, authentication or validation failure
    async fn send(&self, cancel: &CancellationToken, text: &str) -> Result<()>;

    /// Sends a structured message. Same failure contract as [`Notifier::send`].
    async fn send_with_options(&self, cancel: &CancellationToken, message: &Message) -> Result<()>;

    /// Sends platform-native content, such as Slack Block Kit blocks.
    ///
    /// `blocks` is handed to the backend untouched; each backend documents
    /// the shape it accepts. `channel` overrides the default destination.
    /// Backends without a native rich format keep this default, which fails
    /// with a delivery error.
    async fn send_rich(
        &self,
        _cancel: &CancellationToken,
        _channel: Option<&str>,
        _blocks: &serde_json::Value,
    ) -> Result<()> {
        Err(NotificationError::delivery(self.name(), "rich messages not supported").into())
    }
}
