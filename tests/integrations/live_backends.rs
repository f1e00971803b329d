//! Live integration tests for the Slack and Telegram backends.
//!
//! These tests post real messages and are enabled with the `live-tests`
//! feature flag. Each test is skipped when its credentials are not set:
//!
//! - `MULTINOTIFY_LIVE_SLACK_WEBHOOK`
//! - `MULTINOTIFY_LIVE_TELEGRAM_TOKEN` and `MULTINOTIFY_LIVE_TELEGRAM_CHAT`
//!
//! To run these tests:
//! `cargo test --test live_backends --features live-tests -- --nocapture`

#![cfg(feature = "live-tests")]

use multinotify::config::{SlackConfig, TelegramConfig};
use multinotify::notification::{SlackNotifier, TelegramNotifier};
use multinotify::{CancellationToken, Manager, Message, Priority};
use std::sync::Arc;

fn env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

fn live_message(backend: &str) -> Message {
    Message::new(format!("Live test from multinotify ({})", backend))
        .with_title("multinotify live test")
        .with_priority(Priority::Low)
}

#[tokio::test]
async fn test_live_slack() {
    let Some(webhook) = env("MULTINOTIFY_LIVE_SLACK_WEBHOOK") else {
        eprintln!("MULTINOTIFY_LIVE_SLACK_WEBHOOK not set, skipping");
        return;
    };
    let manager = Manager::new();
    manager
        .register(Arc::new(SlackNotifier::new(&SlackConfig::new(webhook)).unwrap()))
        .unwrap();

    manager
        .send_with_options(&CancellationToken::new(), "slack", &live_message("slack"))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_live_telegram() {
    let (Some(token), Some(chat)) = (
        env("MULTINOTIFY_LIVE_TELEGRAM_TOKEN"),
        env("MULTINOTIFY_LIVE_TELEGRAM_CHAT"),
    ) else {
        eprintln!("Telegram credentials not set, skipping");
        return;
    };
    let manager = Manager::new();
    manager
        .register(Arc::new(TelegramNotifier::new(&TelegramConfig::new(token, chat)).unwrap()))
        .unwrap();

    let errors = manager
        .broadcast_with_options(&CancellationToken::new(), &live_message("telegram"))
        .await;
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}
