//! Error type surfaced by every dispatch operation.

use std::fmt;
use thiserror::Error;

/// The category of a [`NotificationError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid registration or backend configuration.
    Config,
    /// No backend is registered under the requested name.
    NotFound,
    /// The backend itself failed to deliver.
    Delivery,
    /// The caller cancelled before or during delivery.
    Cancelled,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorKind::Config => "config",
            ErrorKind::NotFound => "not_found",
            ErrorKind::Delivery => "delivery",
            ErrorKind::Cancelled => "cancelled",
        };
        f.write_str(s)
    }
}

/// A failure attributed to one provider.
#[derive(Debug, Error)]
#[error("{provider}: {message}")]
pub struct NotificationError {
    /// Name of the backend the failure belongs to.
    pub provider: String,
    pub kind: ErrorKind,
    pub message: String,
    #[source]
    pub source: Option<anyhow::Error>,
}

impl NotificationError {
    pub fn new(provider: impl Into<String>, kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            provider: provider.into(),
            kind,
            message: message.into(),
            source: None,
        }
    }

    pub fn config(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::Config, message)
    }

    pub fn not_found(provider: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::NotFound, "notifier not found")
    }

    pub fn delivery(provider: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::Delivery, message)
    }

    pub fn cancelled(provider: impl Into<String>) -> Self {
        Self::new(provider, ErrorKind::Cancelled, "notification cancelled")
    }

    /// Attaches an underlying cause.
    pub fn with_source(mut self, source: impl Into<anyhow::Error>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Converts a backend error into a `NotificationError`.
    ///
    /// Errors that already are a `NotificationError` are returned as-is;
    /// anything else becomes a delivery failure whose message includes the
    /// cause text.
    pub fn wrap(provider: &str, err: anyhow::Error) -> Self {
        match err.downcast::<NotificationError>() {
            Ok(e) => e,
            Err(err) => {
                Self::delivery(provider, format!("send failed: {:#}", err)).with_source(err)
            }
        }
    }

    pub fn is_cancelled(&self) -> bool {
        self.kind == ErrorKind::Cancelled
    }

    pub fn is_not_found(&self) -> bool {
        self.kind == ErrorKind::NotFound
    }
}
