//! Shared HTTP plumbing for the webhook-style backends.

use crate::error::NotificationError;
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error};

/// Builds the client used by a backend, with a per-request timeout.
pub(crate) fn build_client(
    provider: &str,
    timeout: Duration,
) -> Result<reqwest::Client, NotificationError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| {
            NotificationError::config(provider, "failed to build HTTP client").with_source(e)
        })
}

/// POSTs `payload` as JSON and returns the response body.
///
/// The request is abandoned as soon as `cancel` fires. Non-2xx answers are
/// delivery errors carrying the status and body.
pub(crate) async fn post_json(
    client: &reqwest::Client,
    provider: &str,
    url: &str,
    payload: &Value,
    cancel: &CancellationToken,
) -> Result<String, NotificationError> {
    let request = async {
        let response = client.post(url).json(payload).send().await?;
        let status = response.status();
        let body = response.text().await.unwrap_or_default();
        Ok::<_, reqwest::Error>((status, body))
    };

    let (status, body) = tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            debug!(provider, "HTTP request abandoned on cancellation");
            return Err(NotificationError::cancelled(provider));
        }
        result = request => result.map_err(|e| {
            error!(provider, error = %e, "HTTP request failed");
            let reason = if e.is_timeout() { "request timed out" } else { "HTTP request failed" };
            NotificationError::delivery(provider, format!("{}: {}", reason, e)).with_source(e)
        })?,
    };

    if status.is_success() {
        Ok(body)
    } else {
        error!(provider, status = %status, body = %body, "Backend rejected notification");
        Err(NotificationError::delivery(
            provider,
            format!("status {}, body: {}", status, body),
        ))
    }
}

/// Copies every metadata entry into the top level of a JSON payload.
pub(crate) fn merge_metadata<'a>(
    payload: &mut Value,
    metadata: impl IntoIterator<Item = (&'a String, &'a Value)>,
) {
    if let Value::Object(map) = payload {
        for (key, value) in metadata {
            map.insert(key.clone(), value.clone());
        }
    }
}
