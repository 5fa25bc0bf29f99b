//! HTTP SMS gateway and prefix-based routing.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use async_trait::async_trait;
use tracing::{debug, warn};

use super::client::HTTP_CLIENT;
use super::{PhoneNumberProvider, SmsGateway, SmsMessage};
use crate::config::SmsSettings;
use crate::models::Account;

/// Gateway that queues messages by POSTing them as JSON
#[derive(Debug, Clone)]
pub struct HttpSmsGateway {
    id: String,
    url: String,
    timeout: Duration,
}

impl HttpSmsGateway {
    pub fn new(id: impl Into<String>, url: impl Into<String>, timeout_seconds: u64) -> Self {
        Self {
            id: id.into(),
            url: url.into(),
            timeout: Duration::from_secs(timeout_seconds),
        }
    }

    pub fn from_settings(settings: &SmsSettings) -> Self {
        Self::new("http", settings.gateway_url.clone(), settings.timeout_seconds)
    }
}

#[async_trait]
impl SmsGateway for HttpSmsGateway {
    fn id(&self) -> &str {
        &self.id
    }

    async fn queue(&self, sms: &SmsMessage) -> anyhow::Result<bool> {
        let response = HTTP_CLIENT
            .post(&self.url)
            .timeout(self.timeout)
            .json(sms)
            .send()
            .await
            .with_context(|| format!("SMS gateway '{}' request failed", self.id))?;

        let status = response.status();
        if status.is_success() {
            debug!(gateway = %self.id, recipients = sms.recipients.len(), "SMS queued");
        } else {
            warn!(gateway = %self.id, status = status.as_u16(), "SMS gateway refused message");
        }

        Ok(status.is_success())
    }
}

/// Routes numbers to one gateway by prefix and reads verified numbers off
/// the account record.
pub struct PrefixRoutingPhoneNumberProvider {
    gateway: Arc<dyn SmsGateway>,
    /// Empty means every number is routable
    prefixes: Vec<String>,
}

impl PrefixRoutingPhoneNumberProvider {
    pub fn new(gateway: Arc<dyn SmsGateway>, prefixes: Vec<String>) -> Self {
        Self { gateway, prefixes }
    }

    fn is_routable(&self, number: &str) -> bool {
        self.prefixes.is_empty() || self.prefixes.iter().any(|p| number.starts_with(p.as_str()))
    }
}

#[async_trait]
impl PhoneNumberProvider for PrefixRoutingPhoneNumberProvider {
    async fn verified_number_for(&self, account: &Account) -> anyhow::Result<Option<String>> {
        Ok(account
            .phone_number
            .as_ref()
            .filter(|number| account.phone_verified && !number.trim().is_empty())
            .cloned())
    }

    fn route_for(&self, number: &str) -> Option<Arc<dyn SmsGateway>> {
        self.is_routable(number).then(|| self.gateway.clone())
    }
}
