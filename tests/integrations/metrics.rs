//! Integration tests for the `notifications_total` outcome counter.
//!
//! The recorder is process-global, so everything runs in a single test.

#[path = "../helpers/mod.rs"]
mod helpers;

use helpers::mock_notifier::{Behavior, MockNotifier};
use helpers::test_metrics::TestMetrics;
use multinotify::{CancellationToken, Manager};
use serde_json::json;
use std::time::Duration;

#[tokio::test]
async fn test_every_outcome_is_counted() {
    // Arrange
    let metrics = TestMetrics::new();
    metrics::set_global_recorder(metrics.clone()).unwrap();

    let manager = Manager::new();
    manager.register(MockNotifier::succeeding("ok")).unwrap();
    manager.register(MockNotifier::failing("down", "503")).unwrap();
    manager
        .register(MockNotifier::new("slow", Behavior::Delay(Duration::from_secs(30))))
        .unwrap();
    let cancel = CancellationToken::new();

    // Act
    manager.send(&cancel, "ok", "hi").await.unwrap();
    manager.send(&cancel, "down", "hi").await.unwrap_err();
    manager.send(&cancel, "missing", "hi").await.unwrap_err();
    manager
        .send_rich_message(&cancel, "missing", None, &json!([]))
        .await
        .unwrap_err();

    let cancelled = CancellationToken::new();
    let trigger = cancelled.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });
    manager.send(&cancelled, "slow", "hi").await.unwrap_err();

    // Assert
    assert_eq!(metrics.notifications("ok", "success"), 1);
    assert_eq!(metrics.notifications("down", "failure"), 1);
    assert_eq!(metrics.notifications("missing", "failure"), 2);
    assert_eq!(metrics.notifications("slow", "cancelled"), 1);
}
