//! Chat incoming-webhook transport.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use crate::error::{DeliveryError, NotifyError, NotifyResult};
use crate::external::WebhookClient;
use crate::models::{Message, RenderedOutput};
use crate::services::notifications::options::WEBHOOK_URL;
use crate::services::notifications::transport::{Transport, TransportDefinition, TransportKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct WebhookOptions {
    #[serde(default)]
    pub webhook_url: Option<String>,
}

pub struct WebhookTransport {
    url: Url,
    client: Arc<dyn WebhookClient>,
}

impl WebhookTransport {
    /// Fails with a configuration error when no usable URL is configured.
    pub fn new(options: WebhookOptions, client: Arc<dyn WebhookClient>) -> NotifyResult<Self> {
        let raw = options
            .webhook_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
            .ok_or_else(|| {
                NotifyError::configuration(WEBHOOK_URL, "no webhook URL configured")
            })?;

        let url = Url::parse(raw).map_err(|e| {
            NotifyError::configuration(WEBHOOK_URL, format!("invalid URL '{}': {}", raw, e))
        })?;

        Ok(Self { url, client })
    }
}

#[async_trait]
impl Transport for WebhookTransport {
    fn definition(&self) -> &'static TransportDefinition {
        TransportKind::Webhook.definition()
    }

    async fn deliver(&self, rendered: &RenderedOutput, _message: &Message) -> NotifyResult<bool> {
        let payload = json!({ "text": rendered.require("body")?.plain_text() });

        self.client
            .post_json(self.url.as_str(), &payload)
            .await
            .map_err(|e| DeliveryError::transport("webhook", e).into())
    }
}
