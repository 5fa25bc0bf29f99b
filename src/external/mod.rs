//! External delivery collaborators.
//!
//! Transports never talk to a mail server, SMS gateway or webhook endpoint
//! directly; they go through the traits below. Concrete clients built on
//! reqwest and lettre live in the submodules.

pub mod client;
mod sms;
mod smtp;
mod webhook;

pub use sms::{HttpSmsGateway, PrefixRoutingPhoneNumberProvider};
pub use smtp::SmtpMailer;
pub use webhook::HttpWebhookClient;

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::models::Account;

/// Outbound mail handed to a [`Mailer`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MailRequest {
    /// Message bundle the mail was rendered from
    pub template_id: String,
    pub to: String,
    pub language: String,
    pub subject: String,
    pub body: String,
}

#[async_trait]
pub trait Mailer: Send + Sync {
    /// Sends one mail; `Ok(false)` means the server refused it.
    async fn send_mail(&self, request: &MailRequest) -> anyhow::Result<bool>;
}

#[async_trait]
pub trait WebhookClient: Send + Sync {
    /// Posts `body` as JSON; `Ok(true)` when the remote accepted it.
    async fn post_json(&self, url: &str, body: &serde_json::Value) -> anyhow::Result<bool>;
}

/// Outgoing SMS
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SmsMessage {
    pub recipients: Vec<String>,
    pub body: String,
}

impl SmsMessage {
    pub fn to(number: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            recipients: vec![number.into()],
            body: body.into(),
        }
    }
}

#[async_trait]
pub trait SmsGateway: Send + Sync {
    fn id(&self) -> &str;

    /// Queues the message; `Ok(true)` when the gateway accepted it.
    async fn queue(&self, sms: &SmsMessage) -> anyhow::Result<bool>;
}

/// Resolves phone numbers for accounts and gateways for numbers.
#[async_trait]
pub trait PhoneNumberProvider: Send + Sync {
    async fn verified_number_for(&self, account: &Account) -> anyhow::Result<Option<String>>;

    fn route_for(&self, number: &str) -> Option<Arc<dyn SmsGateway>>;
}
