//! Chat webhook client.
//!
//! Posts JSON payloads to incoming-webhook URLs (Slack and compatible
//! services) using the global `HTTP_CLIENT`.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::WebhookClient;
use super::client::HTTP_CLIENT;

/// Webhook client with a per-request timeout
#[derive(Debug, Clone)]
pub struct HttpWebhookClient {
    timeout: Duration,
}

impl HttpWebhookClient {
    pub fn new(timeout_seconds: u64) -> Self {
        Self {
            timeout: Duration::from_secs(timeout_seconds),
        }
    }
}

impl Default for HttpWebhookClient {
    fn default() -> Self {
        Self::new(30)
    }
}

#[async_trait]
impl WebhookClient for HttpWebhookClient {
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> anyhow::Result<bool> {
        let start = Instant::now();

        let response = HTTP_CLIENT
            .post(url)
            .timeout(self.timeout)
            .json(body)
            .send()
            .await
            .with_context(|| format!("POST to webhook failed: {}", url))?;

        let status = response.status();
        let duration_ms = start.elapsed().as_millis() as u64;

        if status.is_success() {
            debug!(status = status.as_u16(), duration_ms, "Webhook accepted payload");
        } else {
            let response_text = response.text().await.unwrap_or_default();
            warn!(
                status = status.as_u16(),
                duration_ms,
                response = %response_text,
                "Webhook rejected payload"
            );
        }

        Ok(status.is_success())
    }
}
