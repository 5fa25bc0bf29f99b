//! Application state shared by CLI handlers.
//!
//! Wires the notifier pipeline from [`Settings`]: in-memory storage seeded
//! with the template field schema, the template renderer, and whichever
//! delivery clients are configured.

use std::sync::Arc;

use crate::config::Settings;
use crate::external::{HttpSmsGateway, HttpWebhookClient, PrefixRoutingPhoneNumberProvider, SmtpMailer};
use crate::render::TemplateRenderer;
use crate::repositories::MemoryStorage;
use crate::services::notifications::options::WEBHOOK_URL;
use crate::services::notifications::{Collaborators, MessageNotifier, TransportRegistry};

/// Application state containing the notifier and its storage.
///
/// Cloning is cheap since both fields are reference counted.
#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<MemoryStorage>,
    pub notifier: Arc<MessageNotifier>,
}

impl AppState {
    /// Builds the notifier from settings.
    ///
    /// # Errors
    /// Returns an error if the SMTP transport cannot be constructed.
    pub fn from_settings(settings: &Settings) -> anyhow::Result<Self> {
        let notifier_settings = &settings.notifier;
        let storage = Arc::new(MemoryStorage::with_templates(&notifier_settings.templates));
        let renderer = Arc::new(TemplateRenderer::new(notifier_settings.templates.clone()));

        let webhook = notifier_settings.webhook.clone().unwrap_or_default();
        let mut collaborators = Collaborators::new(storage.clone())
            .with_webhook_client(Arc::new(HttpWebhookClient::new(webhook.timeout_seconds)));

        if let Some(smtp) = &notifier_settings.smtp {
            collaborators = collaborators.with_mailer(Arc::new(SmtpMailer::new(smtp)?));
        }

        if let Some(sms) = &notifier_settings.sms {
            let gateway = Arc::new(HttpSmsGateway::from_settings(sms));
            collaborators = collaborators.with_phone_numbers(Arc::new(
                PrefixRoutingPhoneNumberProvider::new(gateway, sms.route_prefixes.clone()),
            ));
        }

        let mut registry = TransportRegistry::new(collaborators);
        if let Some(url) = webhook.url {
            registry = registry.with_default("webhook", WEBHOOK_URL, url);
        }

        let notifier = MessageNotifier::new(Arc::new(registry), renderer)
            .with_default_transport(notifier_settings.default_transport.clone());

        Ok(Self {
            storage,
            notifier: Arc::new(notifier),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{SmsSettings, SmtpSettings, WebhookSettings};

    #[tokio::test]
    async fn test_default_settings_wire_test_and_webhook() {
        let state = AppState::from_settings(&Settings::default()).unwrap();
        let registry = state.notifier.registry();

        assert!(registry.has_definition("test", true));
        assert!(registry.has_definition("webhook", true));
        assert!(!registry.has_definition("email", true));
        assert!(!registry.has_definition("sms", true));
        assert_eq!(state.notifier.default_transport(), "email");
    }

    #[tokio::test]
    async fn test_configured_clients_become_instantiable() {
        let mut settings = Settings::default();
        settings.notifier.smtp = Some(SmtpSettings::default());
        settings.notifier.sms = Some(SmsSettings {
            gateway_url: "http://localhost:9/sms".to_string(),
            ..Default::default()
        });
        settings.notifier.webhook = Some(WebhookSettings {
            url: Some("https://hooks.example.com/T0".to_string()),
            ..Default::default()
        });

        let state = AppState::from_settings(&settings).unwrap();
        let registry = state.notifier.registry();

        for id in ["email", "sms", "sms_number", "webhook", "test"] {
            assert!(registry.has_definition(id, true), "{} should be instantiable", id);
        }
        assert_eq!(
            registry.resolve("webhook").unwrap().defaults()[WEBHOOK_URL],
            "https://hooks.example.com/T0"
        );
    }
}
