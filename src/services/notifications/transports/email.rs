//! Email transport.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Deserialize;
use validator::ValidateEmail;

use crate::error::{DeliveryError, NotifyError, NotifyResult};
use crate::external::{MailRequest, Mailer};
use crate::models::{Account, Message, RenderedOutput};
use crate::repositories::Storage;
use crate::services::notifications::options::MAIL_OVERRIDE;
use crate::services::notifications::transport::{Transport, TransportDefinition, TransportKind};

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct EmailOptions {
    /// Send to this address instead of the owner's
    #[serde(default)]
    pub mail_override: Option<String>,
    /// Use the message language rather than the owner's preference
    #[serde(default)]
    pub language_override: bool,
}

pub struct EmailTransport {
    options: EmailOptions,
    storage: Arc<dyn Storage>,
    mailer: Arc<dyn Mailer>,
}

impl EmailTransport {
    pub fn new(
        options: EmailOptions,
        storage: Arc<dyn Storage>,
        mailer: Arc<dyn Mailer>,
    ) -> NotifyResult<Self> {
        if let Some(address) = &options.mail_override
            && !address.validate_email()
        {
            return Err(NotifyError::configuration(
                MAIL_OVERRIDE,
                format!("'{}' is not a valid email address", address),
            ));
        }

        Ok(Self {
            options,
            storage,
            mailer,
        })
    }

    async fn load_owner(&self, message: &Message) -> NotifyResult<Option<Account>> {
        let Some(owner) = message.owner else {
            return Ok(None);
        };

        self.storage
            .load_account(owner)
            .await
            .map_err(|e| {
                DeliveryError::transport("email", e.context(format!("load account {}", owner)))
                    .into()
            })
    }

    fn language(&self, owner: Option<&Account>, message: &Message) -> String {
        if self.options.language_override {
            return message.language.clone();
        }

        owner
            .and_then(|account| account.preferred_language.clone())
            .unwrap_or_else(|| message.language.clone())
    }
}

#[async_trait]
impl Transport for EmailTransport {
    fn definition(&self) -> &'static TransportDefinition {
        TransportKind::Email.definition()
    }

    async fn deliver(&self, rendered: &RenderedOutput, message: &Message) -> NotifyResult<bool> {
        let owner = self.load_owner(message).await?;

        let to = match (&self.options.mail_override, &owner) {
            (Some(address), _) => address.clone(),
            (None, Some(account)) if !account.email.trim().is_empty() => account.email.clone(),
            (None, Some(account)) => {
                return Err(DeliveryError::NoRecipient {
                    transport: "email",
                    reason: format!("account {} has no email address", account.id),
                }
                .into());
            }
            (None, None) => {
                return Err(DeliveryError::NoRecipient {
                    transport: "email",
                    reason: format!(
                        "message has no loadable owner (user ID {}) and no {}",
                        message.owner_label(),
                        MAIL_OVERRIDE
                    ),
                }
                .into());
            }
        };

        let request = MailRequest {
            template_id: message.bundle.clone(),
            to,
            language: self.language(owner.as_ref(), message),
            subject: rendered.require("mail_subject")?.stripped().trim().to_string(),
            body: rendered.require("mail_body")?.text.clone(),
        };

        self.mailer
            .send_mail(&request)
            .await
            .map_err(|e| DeliveryError::transport("email", e).into())
    }
}
