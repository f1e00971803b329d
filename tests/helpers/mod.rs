#![allow(dead_code)]
pub mod test_metrics;

use mock_notifier::MockNotifier;
use multinotify::Manager;
use std::sync::Arc;

/// Creates a manager with one succeeding notifier per name.
pub fn manager_with(names: &[&str]) -> (Manager, Vec<Arc<MockNotifier>>) {
    let manager = Manager::new();
    let mocks: Vec<_> = names.iter().map(|name| MockNotifier::succeeding(name)).collect();
    for mock in &mocks {
        manager.register(mock.clone()).unwrap();
    }
    (manager, mocks)
}

/// Drains an asynchronous broadcast, failing the test if it does not close.
pub async fn drain(
    results: async_channel::Receiver<multinotify::NotificationResult>,
    timeout: std::time::Duration,
) -> Vec<multinotify::NotificationResult> {
    tokio::time::timeout(timeout, async {
        let mut collected = Vec::new();
        while let Ok(result) = results.recv().await {
            collected.push(result);
        }
        collected
    })
    .await
    .expect("Result stream did not close in time")
}
