//! Transport registry.
//!
//! Maps transport ids to their static definition, registry-level default
//! options and a factory. The registry is built once and only read
//! afterwards.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::logging::{NotifyLogger, TracingLogger};
use super::options::{
    CommonOptions, DispatchOptions, OptionMap, common_defaults, merge_layers, parse_options,
};
use super::transport::{Transport, TransportDefinition, TransportKind};
use super::transports::{EmailTransport, SmsNumberTransport, SmsTransport, TestTransport, WebhookTransport};
use crate::error::{NotifyError, NotifyResult};
use crate::external::{Mailer, PhoneNumberProvider, WebhookClient};
use crate::repositories::Storage;

/// Builds a transport from fully merged options
pub type TransportFactory =
    Box<dyn Fn(&OptionMap) -> NotifyResult<Box<dyn Transport>> + Send + Sync>;

/// Services the transports and the dispatcher reach out to
#[derive(Clone)]
pub struct Collaborators {
    pub storage: Arc<dyn Storage>,
    pub logger: Arc<dyn NotifyLogger>,
    pub mailer: Option<Arc<dyn Mailer>>,
    pub phone_numbers: Option<Arc<dyn PhoneNumberProvider>>,
    pub webhook: Option<Arc<dyn WebhookClient>>,
}

impl Collaborators {
    pub fn new(storage: Arc<dyn Storage>) -> Self {
        Self {
            storage,
            logger: Arc::new(TracingLogger),
            mailer: None,
            phone_numbers: None,
            webhook: None,
        }
    }

    pub fn with_logger(mut self, logger: Arc<dyn NotifyLogger>) -> Self {
        self.logger = logger;
        self
    }

    pub fn with_mailer(mut self, mailer: Arc<dyn Mailer>) -> Self {
        self.mailer = Some(mailer);
        self
    }

    pub fn with_phone_numbers(mut self, provider: Arc<dyn PhoneNumberProvider>) -> Self {
        self.phone_numbers = Some(provider);
        self
    }

    pub fn with_webhook_client(mut self, client: Arc<dyn WebhookClient>) -> Self {
        self.webhook = Some(client);
        self
    }
}

/// One registered transport
pub struct TransportEntry {
    definition: &'static TransportDefinition,
    defaults: OptionMap,
    factory: Option<TransportFactory>,
    /// Collaborator the factory is waiting for, when absent
    missing: Option<&'static str>,
}

impl TransportEntry {
    pub fn definition(&self) -> &'static TransportDefinition {
        self.definition
    }

    pub fn defaults(&self) -> &OptionMap {
        &self.defaults
    }

    pub fn is_instantiable(&self) -> bool {
        self.factory.is_some()
    }

    /// Options after layering built-in, registry and per-call values.
    pub fn merged_options(&self, options: &DispatchOptions) -> OptionMap {
        let common = common_defaults();
        merge_layers([&common, &self.defaults, options.as_map()])
    }

    /// Creates the transport and parses the common options.
    pub fn instantiate(
        &self,
        options: &DispatchOptions,
    ) -> NotifyResult<(Box<dyn Transport>, CommonOptions)> {
        let factory = self.factory.as_ref().ok_or_else(|| {
            NotifyError::configuration(
                self.definition.id,
                format!(
                    "no {} configured for the {} transport",
                    self.missing.unwrap_or("collaborator"),
                    self.definition.title
                ),
            )
        })?;

        let merged = self.merged_options(options);
        let common: CommonOptions = parse_options(&merged)?;
        let transport = factory(&merged)?;

        Ok((transport, common))
    }
}

/// Registry of every [`TransportKind`]
pub struct TransportRegistry {
    entries: HashMap<&'static str, TransportEntry>,
    collaborators: Collaborators,
}

impl TransportRegistry {
    pub fn new(collaborators: Collaborators) -> Self {
        let entries = TransportKind::ALL
            .into_iter()
            .map(|kind| {
                let (factory, missing) = Self::factory_for(kind, &collaborators);
                let entry = TransportEntry {
                    definition: kind.definition(),
                    defaults: OptionMap::new(),
                    factory,
                    missing,
                };
                (kind.id(), entry)
            })
            .collect();

        Self {
            entries,
            collaborators,
        }
    }

    fn factory_for(
        kind: TransportKind,
        collaborators: &Collaborators,
    ) -> (Option<TransportFactory>, Option<&'static str>) {
        let storage = collaborators.storage.clone();
        let logger = collaborators.logger.clone();

        match kind {
            TransportKind::Email => match collaborators.mailer.clone() {
                Some(mailer) => (
                    Some(Box::new(move |options: &OptionMap| {
                        let transport =
                            EmailTransport::new(parse_options(options)?, storage.clone(), mailer.clone())?;
                        Ok(Box::new(transport) as Box<dyn Transport>)
                    })),
                    None,
                ),
                None => (None, Some("mailer")),
            },
            TransportKind::Sms => match collaborators.phone_numbers.clone() {
                Some(provider) => (
                    Some(Box::new(move |options: &OptionMap| {
                        let transport = SmsTransport::new(
                            parse_options(options)?,
                            storage.clone(),
                            provider.clone(),
                            logger.clone(),
                        );
                        Ok(Box::new(transport) as Box<dyn Transport>)
                    })),
                    None,
                ),
                None => (None, Some("phone number provider")),
            },
            TransportKind::SmsNumber => match collaborators.phone_numbers.clone() {
                Some(provider) => (
                    Some(Box::new(move |options: &OptionMap| {
                        let transport = SmsNumberTransport::new(parse_options(options)?, provider.clone());
                        Ok(Box::new(transport) as Box<dyn Transport>)
                    })),
                    None,
                ),
                None => (None, Some("phone number provider")),
            },
            TransportKind::Webhook => match collaborators.webhook.clone() {
                Some(client) => (
                    Some(Box::new(move |options: &OptionMap| {
                        let transport = WebhookTransport::new(parse_options(options)?, client.clone())?;
                        Ok(Box::new(transport) as Box<dyn Transport>)
                    })),
                    None,
                ),
                None => (None, Some("webhook client")),
            },
            TransportKind::Test => (
                Some(Box::new(|_: &OptionMap| Ok(Box::new(TestTransport) as Box<dyn Transport>))),
                None,
            ),
        }
    }

    /// Sets a registry-level default option for one transport. Unknown ids
    /// are ignored.
    pub fn with_default(
        mut self,
        transport: &str,
        key: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Self {
        if let Some(entry) = self.entries.get_mut(transport) {
            entry.defaults.insert(key.into(), value.into());
        }
        self
    }

    /// Exact lookup by transport id.
    pub fn resolve(&self, name: &str) -> Option<&TransportEntry> {
        self.entries.get(name)
    }

    pub fn has_definition(&self, name: &str, require_instantiable: bool) -> bool {
        self.resolve(name)
            .is_some_and(|entry| !require_instantiable || entry.is_instantiable())
    }

    /// All definitions in registration order.
    pub fn definitions(&self) -> impl Iterator<Item = &'static TransportDefinition> + '_ {
        TransportKind::ALL
            .into_iter()
            .filter_map(|kind| self.resolve(kind.id()))
            .map(TransportEntry::definition)
    }

    pub fn collaborators(&self) -> &Collaborators {
        &self.collaborators
    }
}
