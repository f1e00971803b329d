//! A process-wide convenience `Manager`.
//!
//! Prefer constructing a [`Manager`] and passing it where it is needed. This
//! module exists for call sites where threading one through is impractical.
//! [`reset`] drops the shared instance so tests can start from scratch.

use crate::core::{Message, NotificationResult, Notifier};
use crate::error::NotificationError;
use crate::notification::Manager;
use crate::services::{register_backends, Backend};
use serde_json::Value;
use std::sync::{Arc, PoisonError, RwLock};
use tokio_util::sync::CancellationToken;

static GLOBAL: RwLock<Option<Arc<Manager>>> = RwLock::new(None);

/// Creates the shared manager if it does not exist yet.
pub fn init() {
    let mut global = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    if global.is_none() {
        *global = Some(Arc::new(Manager::new()));
    }
}

/// Returns the shared manager, creating it on first use.
pub fn global() -> Arc<Manager> {
    if let Some(manager) = GLOBAL.read().unwrap_or_else(PoisonError::into_inner).as_ref() {
        return manager.clone();
    }
    let mut global = GLOBAL.write().unwrap_or_else(PoisonError::into_inner);
    global.get_or_insert_with(|| Arc::new(Manager::new())).clone()
}

/// Initializes the shared manager and registers each backend.
///
/// Stops at the first backend that cannot be built or registered; the
/// backends registered before it stay registered.
pub fn setup<I, B>(backends: I) -> Result<(), NotificationError>
where
    I: IntoIterator<Item = B>,
    B: Into<Backend>,
{
    init();
    register_backends(&global(), backends.into_iter().map(Into::into))
}

/// Drops the shared manager. The next access starts with an empty registry.
pub fn reset() {
    *GLOBAL.write().unwrap_or_else(PoisonError::into_inner) = None;
}

pub fn register(notifier: Arc<dyn Notifier>) -> Result<(), NotificationError> {
    global().register(notifier)
}

pub fn unregister(name: &str) {
    global().unregister(name)
}

pub fn get(name: &str) -> Option<Arc<dyn Notifier>> {
    global().get(name)
}

pub fn list() -> Vec<String> {
    global().list()
}

pub async fn send(
    cancel: &CancellationToken,
    provider: &str,
    text: &str,
) -> Result<(), NotificationError> {
    global().send(cancel, provider, text).await
}

pub async fn send_with_options(
    cancel: &CancellationToken,
    provider: &str,
    message: &Message,
) -> Result<(), NotificationError> {
    global().send_with_options(cancel, provider, message).await
}

pub async fn send_rich_message(
    cancel: &CancellationToken,
    provider: &str,
    channel: Option<&str>,
    blocks: &Value,
) -> Result<(), NotificationError> {
    global().send_rich_message(cancel, provider, channel, blocks).await
}

pub async fn broadcast(cancel: &CancellationToken, text: &str) -> Vec<NotificationError> {
    global().broadcast(cancel, text).await
}

pub async fn broadcast_with_options(
    cancel: &CancellationToken,
    message: &Message,
) -> Vec<NotificationError> {
    global().broadcast_with_options(cancel, message).await
}

pub fn broadcast_async(
    cancel: &CancellationToken,
    text: &str,
) -> async_channel::Receiver<NotificationResult> {
    global().broadcast_async(cancel, text)
}

pub fn broadcast_async_with_options(
    cancel: &CancellationToken,
    message: &Message,
) -> async_channel::Receiver<NotificationResult> {
    global().broadcast_async_with_options(cancel, message)
}
