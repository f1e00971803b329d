//! The notification manager owns the registry of named backends and
//! dispatches messages to one of them or to all of them.

use crate::core::{Message, NotificationResult, Notifier};
use crate::error::NotificationError;
use futures::future::join_all;
use futures::FutureExt;
use std::collections::BTreeMap;
use serde_json::Value;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

/// What a dispatch hands to each backend.
#[derive(Clone)]
enum Payload {
    Text(Arc<str>),
    Message(Arc<Message>),
    Rich {
        channel: Option<Arc<str>>,
        blocks: Arc<Value>,
    },
}

impl Payload {
    async fn deliver(
        &self,
        notifier: &dyn Notifier,
        cancel: &CancellationToken,
    ) -> anyhow::Result<()> {
        match self {
            Payload::Text(text) => notifier.send(cancel, text).await,
            Payload::Message(message) => notifier.send_with_options(cancel, message).await,
            Payload::Rich { channel, blocks } => {
                notifier.send_rich(cancel, channel.as_deref(), blocks).await
            }
        }
    }
}

/// A concurrent registry of notifiers keyed by name.
///
/// Registry reads share a lock and registration changes take it
/// exclusively. The lock is never held across a backend call: every
/// dispatch works on a snapshot of the `Arc`s it resolved.
#[derive(Default)]
pub struct Manager {
    notifiers: RwLock<BTreeMap<String, Arc<dyn Notifier>>>,
}

impl Manager {
    /// Creates an empty `Manager`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a notifier under its own name.
    ///
    /// Fails with a config error if the name is empty or already taken; the
    /// existing registration is left untouched.
    pub fn register(&self, notifier: Arc<dyn Notifier>) -> Result<(), NotificationError> {
        let name = notifier.name().to_string();
        if name.is_empty() {
            return Err(NotificationError::config(name, "notifier name must not be empty"));
        }

        let mut notifiers = self.notifiers.write().unwrap_or_else(PoisonError::into_inner);
        if notifiers.contains_key(&name) {
            return Err(NotificationError::config(name, "notifier already registered"));
        }
        debug!(provider = %name, "Registered notifier");
        notifiers.insert(name, notifier);
        Ok(())
    }

    /// Removes a notifier. Unknown names are ignored.
    pub fn unregister(&self, name: &str) {
        let removed = self
            .notifiers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(name);
        if removed.is_some() {
            debug!(provider = %name, "Unregistered notifier");
        }
    }

    /// Looks up a notifier by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Notifier>> {
        self.notifiers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(name)
            .cloned()
    }

    /// Returns the registered names in ascending order.
    pub fn list(&self) -> Vec<String> {
        self.notifiers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.notifiers.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Sends plain text to a single provider.
    ///
    /// Returns promptly with a cancelled error once `cancel` fires, even if
    /// the backend is still busy.
    #[instrument(skip(self, cancel, text))]
    pub async fn send(
        &self,
        cancel: &CancellationToken,
        provider: &str,
        text: &str,
    ) -> Result<(), NotificationError> {
        let payload = Payload::Text(Arc::from(text));
        self.send_payload(cancel, provider, payload).await
    }

    /// Sends a structured message to a single provider.
    #[instrument(skip(self, cancel, message))]
    pub async fn send_with_options(
        &self,
        cancel: &CancellationToken,
        provider: &str,
        message: &Message,
    ) -> Result<(), NotificationError> {
        let payload = Payload::Message(Arc::new(message.clone()));
        self.send_payload(cancel, provider, payload).await
    }

    /// Sends platform-native content to a single provider.
    ///
    /// `blocks` is passed through to [`Notifier::send_rich`] untouched, with
    /// `channel` overriding the provider's default destination. Lookup,
    /// cancellation and error wrapping follow [`Manager::send`].
    #[instrument(skip(self, cancel, blocks))]
    pub async fn send_rich_message(
        &self,
        cancel: &CancellationToken,
        provider: &str,
        channel: Option<&str>,
        blocks: &Value,
    ) -> Result<(), NotificationError> {
        let payload = Payload::Rich {
            channel: channel.map(Arc::from),
            blocks: Arc::new(blocks.clone()),
        };
        self.send_payload(cancel, provider, payload).await
    }

    /// Sends plain text to every registered provider.
    ///
    /// Every provider is attempted exactly once; the returned list holds one
    /// error per provider that failed and is empty when all succeeded.
    #[instrument(skip_all)]
    pub async fn broadcast(
        &self,
        cancel: &CancellationToken,
        text: &str,
    ) -> Vec<NotificationError> {
        let payload = Payload::Text(Arc::from(text));
        self.broadcast_payload(cancel, payload).await
    }

    /// Sends a structured message to every registered provider.
    #[instrument(skip_all)]
    pub async fn broadcast_with_options(
        &self,
        cancel: &CancellationToken,
        message: &Message,
    ) -> Vec<NotificationError> {
        let payload = Payload::Message(Arc::new(message.clone()));
        self.broadcast_payload(cancel, payload).await
    }

    /// Sends plain text to every registered provider concurrently and
    /// streams one [`NotificationResult`] per provider as each completes.
    ///
    /// The receiver closes once every provider has reported. A backend that
    /// ignores cancellation keeps the stream open until it returns.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn broadcast_async(
        &self,
        cancel: &CancellationToken,
        text: &str,
    ) -> async_channel::Receiver<NotificationResult> {
        self.fan_out(cancel, Payload::Text(Arc::from(text)))
    }

    /// Structured-message variant of [`Manager::broadcast_async`].
    pub fn broadcast_async_with_options(
        &self,
        cancel: &CancellationToken,
        message: &Message,
    ) -> async_channel::Receiver<NotificationResult> {
        self.fan_out(cancel, Payload::Message(Arc::new(message.clone())))
    }

    fn snapshot(&self) -> Vec<(String, Arc<dyn Notifier>)> {
        self.notifiers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|(name, notifier)| (name.clone(), notifier.clone()))
            .collect()
    }

    async fn send_payload(
        &self,
        cancel: &CancellationToken,
        provider: &str,
        payload: Payload,
    ) -> Result<(), NotificationError> {
        let outcome = if cancel.is_cancelled() {
            Err(NotificationError::cancelled(provider))
        } else if let Some(notifier) = self.get(provider) {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => Err(NotificationError::cancelled(provider)),
                outcome = attempt(provider, notifier.as_ref(), cancel, &payload) => outcome,
            }
        } else {
            warn!(provider, "No notifier registered under this name");
            Err(NotificationError::not_found(provider))
        };
        record_outcome(provider, &outcome);
        outcome
    }

    async fn broadcast_payload(
        &self,
        cancel: &CancellationToken,
        payload: Payload,
    ) -> Vec<NotificationError> {
        let targets = self.snapshot();
        let total = targets.len();

        let attempts = targets.iter().map(|(name, notifier)| {
            let payload = &payload;
            async move {
                let outcome = attempt(name, notifier.as_ref(), cancel, payload).await;
                record_outcome(name, &outcome);
                outcome
            }
        });
        let errors: Vec<NotificationError> = join_all(attempts)
            .await
            .into_iter()
            .filter_map(Result::err)
            .collect();

        if errors.is_empty() {
            info!(providers = total, "Broadcast delivered to all providers");
        } else {
            warn!(
                providers = total,
                failed = errors.len(),
                "Broadcast finished with failures"
            );
        }
        errors
    }

    fn fan_out(
        &self,
        cancel: &CancellationToken,
        payload: Payload,
    ) -> async_channel::Receiver<NotificationResult> {
        let targets = self.snapshot();
        // One slot per provider, so no unit ever waits on a slow consumer.
        let (result_tx, result_rx) = async_channel::bounded(targets.len().max(1));
        debug!(providers = targets.len(), "Starting asynchronous broadcast");

        for (name, notifier) in targets {
            let result_tx = result_tx.clone();
            let cancel = cancel.clone();
            let payload = payload.clone();

            tokio::spawn(async move {
                let outcome = attempt(&name, notifier.as_ref(), &cancel, &payload).await;
                record_outcome(&name, &outcome);

                if result_tx
                    .send(NotificationResult::from_outcome(&name, outcome))
                    .await
                    .is_err()
                {
                    debug!(provider = %name, "Result receiver dropped before delivery");
                }
            });
        }

        // The stream closes when the last unit drops its sender.
        result_rx
    }
}

/// Runs one backend call. Declines to start if already cancelled.
///
/// A panic inside the backend is caught and reported as a delivery error so
/// it cannot take other dispatches down with it.
async fn attempt(
    provider: &str,
    notifier: &dyn Notifier,
    cancel: &CancellationToken,
    payload: &Payload,
) -> Result<(), NotificationError> {
    if cancel.is_cancelled() {
        return Err(NotificationError::cancelled(provider));
    }
    match AssertUnwindSafe(payload.deliver(notifier, cancel))
        .catch_unwind()
        .await
    {
        Ok(result) => result.map_err(|e| NotificationError::wrap(provider, e)),
        Err(panic) => {
            let reason = panic_message(panic.as_ref());
            warn!(provider, reason = %reason, "Notifier panicked");
            Err(NotificationError::delivery(
                provider,
                format!("notifier panicked: {}", reason),
            ))
        }
    }
}

fn record_outcome(provider: &str, outcome: &Result<(), NotificationError>) {
    let status = match outcome {
        Ok(()) => "success",
        Err(e) if e.is_cancelled() => "cancelled",
        Err(_) => "failure",
    };
    metrics::counter!(
        "notifications_total",
        "provider" => provider.to_string(),
        "status" => status
    )
    .increment(1);

    match outcome {
        Ok(()) => debug!(provider, "Notification delivered"),
        Err(e) => warn!(provider, kind = %e.kind, error = %e, "Notification failed"),
    }
}

fn panic_message(panic: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}
