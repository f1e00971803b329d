//! Integration tests for the bundled HTTP backends behind a `Manager`.

use multinotify::config::{SlackConfig, TelegramConfig};
use multinotify::notification::{SlackNotifier, TelegramNotifier};
use multinotify::{Attachment, CancellationToken, ErrorKind, Field, Manager, Message, Priority};
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn manager_against(server: &MockServer) -> Manager {
    let manager = Manager::new();

    let slack = SlackConfig::new(format!("{}/slack", server.uri()));
    manager.register(Arc::new(SlackNotifier::new(&slack).unwrap())).unwrap();

    let mut telegram = TelegramConfig::new("123:abc", "42");
    telegram.api_base_url = server.uri();
    manager.register(Arc::new(TelegramNotifier::new(&telegram).unwrap())).unwrap();

    manager
}

#[tokio::test]
async fn test_broadcast_reaches_both_backends() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slack"))
        .and(body_partial_json(json!({ "text": "release 1.0 shipped" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({ "chat_id": "42", "text": "release 1.0 shipped" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    let manager = manager_against(&server).await;

    // Act
    let errors = manager
        .broadcast(&CancellationToken::new(), "release 1.0 shipped")
        .await;

    // Assert
    assert!(errors.is_empty(), "unexpected errors: {:?}", errors);
}

#[tokio::test]
async fn test_one_backend_down_is_reported_with_its_name() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/slack"))
        .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .mount(&server)
        .await;
    let manager = manager_against(&server).await;

    // Act
    let msg = Message::new("db failover")
        .with_title("Incident")
        .with_priority(Priority::High)
        .with_attachment(Attachment::new("primary").with_field(Field::new("Lag", "12s", true)));
    let results = manager.broadcast_async_with_options(&CancellationToken::new(), &msg);
    let mut collected = Vec::new();
    while let Ok(result) = results.recv().await {
        collected.push(result);
    }

    // Assert
    collected.sort_by(|a, b| a.provider.cmp(&b.provider));
    assert_eq!(collected.len(), 2);
    assert_eq!(collected[0].provider, "slack");
    let err = collected[0].error.as_ref().unwrap();
    assert_eq!(err.kind, ErrorKind::Delivery);
    assert!(err.message.contains("503"));
    assert!(collected[1].success);
}

#[tokio::test]
async fn test_cancel_aborts_slow_backend() {
    // Arrange
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(5)))
        .mount(&server)
        .await;
    let manager = manager_against(&server).await;
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(100)).await;
        trigger.cancel();
    });

    // Act
    let errors = tokio::time::timeout(Duration::from_secs(2), manager.broadcast(&cancel, "hi"))
        .await
        .expect("broadcast did not observe cancellation");

    // Assert
    assert_eq!(errors.len(), 2);
    assert!(errors.iter().all(|e| e.is_cancelled()));
}

#[tokio::test]
async fn test_rich_message_uses_each_backend_format() {
    // Arrange
    let server = MockServer::start().await;
    let slack_blocks = json!([
        { "type": "header", "text": { "type": "plain_text", "text": "Deployment" } },
        { "type": "divider" }
    ]);
    Mock::given(method("POST"))
        .and(path("/slack"))
        .and(body_partial_json(json!({ "blocks": slack_blocks })))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/bot123:abc/sendMessage"))
        .and(body_partial_json(json!({ "chat_id": "42", "text": "Deployment\n\nVersion: v1.2.3" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "ok": true })))
        .expect(1)
        .mount(&server)
        .await;
    let manager = manager_against(&server).await;
    let cancel = CancellationToken::new();

    // Act
    let slack = manager
        .send_rich_message(&cancel, "slack", None, &slack_blocks)
        .await;
    let telegram = manager
        .send_rich_message(&cancel, "telegram", None, &json!(["Deployment", "", "Version: v1.2.3"]))
        .await;

    // Assert
    assert!(slack.is_ok(), "slack: {:?}", slack);
    assert!(telegram.is_ok(), "telegram: {:?}", telegram);
}
