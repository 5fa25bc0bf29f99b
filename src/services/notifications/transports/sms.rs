//! SMS transports.
//!
//! Both variants share the payload rules: the `sms_body` view mode is
//! stripped of markup and trimmed, and an empty result is never queued.
//! They differ in how the recipient number is found.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::{DeliveryError, NotifyResult};
use crate::external::{PhoneNumberProvider, SmsMessage};
use crate::models::{Message, RenderedOutput};
use crate::repositories::Storage;
use crate::services::notifications::logging::NotifyLogger;
use crate::services::notifications::transport::{Transport, TransportDefinition, TransportKind};

/// Message field read by `sms_number` when no number option is given
const SMS_NUMBER_FIELD: &str = "sms_number";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SmsOptions {
    #[serde(default)]
    pub phone_number: Option<String>,
}

impl SmsOptions {
    fn phone_number(&self) -> Option<&str> {
        self.phone_number
            .as_deref()
            .map(str::trim)
            .filter(|number| !number.is_empty())
    }
}

fn sms_body(rendered: &RenderedOutput) -> NotifyResult<String> {
    let body = rendered.require("sms_body")?.stripped().trim().to_string();
    if body.is_empty() {
        return Err(DeliveryError::EmptyPayload { transport: "SMS" }.into());
    }
    Ok(body)
}

async fn queue(provider: &dyn PhoneNumberProvider, number: &str, body: String) -> NotifyResult<bool> {
    let gateway = provider.route_for(number).ok_or_else(|| DeliveryError::Route {
        number: number.to_string(),
    })?;

    gateway
        .queue(&SmsMessage::to(number, body))
        .await
        .map_err(|e| DeliveryError::transport("sms", e).into())
}

/// SMS to the verified number of the message owner
pub struct SmsTransport {
    options: SmsOptions,
    storage: Arc<dyn Storage>,
    provider: Arc<dyn PhoneNumberProvider>,
    logger: Arc<dyn NotifyLogger>,
}

impl SmsTransport {
    pub fn new(
        options: SmsOptions,
        storage: Arc<dyn Storage>,
        provider: Arc<dyn PhoneNumberProvider>,
        logger: Arc<dyn NotifyLogger>,
    ) -> Self {
        Self {
            options,
            storage,
            provider,
            logger,
        }
    }

    /// Returns the number together with a label for log events.
    async fn recipient(&self, message: &Message) -> NotifyResult<(String, String)> {
        if let Some(number) = self.options.phone_number() {
            return Ok((number.to_string(), number.to_string()));
        }

        let owner = match message.owner {
            Some(id) => self
                .storage
                .load_account(id)
                .await
                .map_err(|e| {
                    DeliveryError::transport("sms", e.context(format!("load account {}", id)))
                })?,
            None => None,
        };
        let account = owner.ok_or_else(|| DeliveryError::NoRecipient {
            transport: "sms",
            reason: format!("message owner (user ID {}) does not exist", message.owner_label()),
        })?;

        let label = format!("{} (user ID {})", account.name, account.id);
        let number = self
            .provider
            .verified_number_for(&account)
            .await
            .map_err(|e| DeliveryError::transport("sms", e))?
            .ok_or_else(|| DeliveryError::NoPhoneNumber {
                recipient: label.clone(),
            })?;

        Ok((number, label))
    }
}

#[async_trait]
impl Transport for SmsTransport {
    fn definition(&self) -> &'static TransportDefinition {
        TransportKind::Sms.definition()
    }

    async fn deliver(&self, rendered: &RenderedOutput, message: &Message) -> NotifyResult<bool> {
        let body = sms_body(rendered)?;
        let (number, label) = self.recipient(message).await?;

        let queued = queue(self.provider.as_ref(), &number, body).await?;
        if queued {
            self.logger
                .info("Queued SMS for {recipient}.", &[("recipient", label)]);
        }
        Ok(queued)
    }
}

/// SMS to a number from the options or from the message itself
pub struct SmsNumberTransport {
    options: SmsOptions,
    provider: Arc<dyn PhoneNumberProvider>,
}

impl SmsNumberTransport {
    pub fn new(options: SmsOptions, provider: Arc<dyn PhoneNumberProvider>) -> Self {
        Self { options, provider }
    }

    fn number(&self, message: &Message) -> NotifyResult<String> {
        self.options
            .phone_number()
            .or_else(|| {
                message
                    .field(SMS_NUMBER_FIELD)
                    .map(|value| value.value().trim())
                    .filter(|number| !number.is_empty())
            })
            .map(str::to_string)
            .ok_or_else(|| {
                DeliveryError::NoPhoneNumber {
                    recipient: format!("message owned by user ID {}", message.owner_label()),
                }
                .into()
            })
    }
}

#[async_trait]
impl Transport for SmsNumberTransport {
    fn definition(&self) -> &'static TransportDefinition {
        TransportKind::SmsNumber.definition()
    }

    async fn deliver(&self, rendered: &RenderedOutput, message: &Message) -> NotifyResult<bool> {
        let body = sms_body(rendered)?;
        let number = self.number(message)?;
        queue(self.provider.as_ref(), &number, body).await
    }
}
