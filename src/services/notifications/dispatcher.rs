//! Dispatch pipeline.
//!
//! One `send` call walks a message through lookup, instantiation, access
//! check, render, delivery and post-processing. Configuration-class errors
//! and failed saves are returned to the caller. Anything that goes wrong
//! while delivering is logged and reported as `Ok(false)`.

use std::sync::Arc;

use tracing::debug;

use super::logging::LogLevel;
use super::options::DispatchOptions;
use super::recorder::{DeliveryOutcome, OutcomeRecorder};
use super::registry::TransportRegistry;
use super::transport::{Transport, TransportDefinition, TransportKind};
use crate::error::{NotifyError, NotifyResult};
use crate::models::{Message, RenderedOutput};
use crate::render::Renderer;

/// Access check run before anything is rendered
pub trait AccessGate: Send + Sync {
    fn can_access(&self, definition: &TransportDefinition, message: &Message) -> bool;
}

#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAll;

impl AccessGate for AllowAll {
    fn can_access(&self, _definition: &TransportDefinition, _message: &Message) -> bool {
        true
    }
}

/// Sends messages through registered transports
pub struct MessageNotifier {
    registry: Arc<TransportRegistry>,
    renderer: Arc<dyn Renderer>,
    gate: Arc<dyn AccessGate>,
    recorder: OutcomeRecorder,
    default_transport: String,
}

impl MessageNotifier {
    pub fn new(registry: Arc<TransportRegistry>, renderer: Arc<dyn Renderer>) -> Self {
        let collaborators = registry.collaborators();
        let recorder = OutcomeRecorder::new(
            collaborators.storage.clone(),
            collaborators.logger.clone(),
        );

        Self {
            registry,
            renderer,
            gate: Arc::new(AllowAll),
            recorder,
            default_transport: TransportKind::Email.id().to_string(),
        }
    }

    pub fn with_access_gate(mut self, gate: Arc<dyn AccessGate>) -> Self {
        self.gate = gate;
        self
    }

    pub fn with_default_transport(mut self, transport: impl Into<String>) -> Self {
        self.default_transport = transport.into();
        self
    }

    pub fn registry(&self) -> &TransportRegistry {
        &self.registry
    }

    pub fn default_transport(&self) -> &str {
        &self.default_transport
    }

    /// Sends `message` through the transport registered as `transport_name`.
    ///
    /// Returns whether the message was delivered.
    pub async fn send(
        &self,
        message: &mut Message,
        options: &DispatchOptions,
        transport_name: &str,
    ) -> NotifyResult<bool> {
        let Some(entry) = self.registry.resolve(transport_name) else {
            return Err(NotifyError::UnknownTransport {
                name: transport_name.to_string(),
            });
        };

        let (transport, common) = entry.instantiate(options)?;
        let definition = transport.definition();

        if !transport.can_access(message) || !self.gate.can_access(definition, message) {
            debug!(transport = definition.id, "Access denied, message not sent");
            return Ok(false);
        }

        let rendered = self.render(transport.as_ref(), message)?;
        rendered.ensure_covers(transport.view_modes())?;

        let outcome = self.deliver(transport.as_ref(), &rendered, message).await;
        self.recorder
            .post_process(&outcome, &rendered, message, &common, definition)
            .await?;

        Ok(outcome.delivered)
    }

    /// Sends the message to its owner through the default transport.
    pub async fn send_to_owner(&self, message: &mut Message) -> NotifyResult<bool> {
        let transport = self.default_transport.clone();
        self.send(message, &DispatchOptions::new(), &transport).await
    }

    fn render(&self, transport: &dyn Transport, message: &Message) -> NotifyResult<RenderedOutput> {
        let view_modes = transport.view_modes();
        let mut rendered = RenderedOutput::new();

        for view_mode in view_modes {
            let content = self.renderer.render(message, view_mode).map_err(|source| {
                NotifyError::Render {
                    view_mode: view_mode.to_string(),
                    source,
                }
            })?;
            rendered.insert(*view_mode, content);
        }

        Ok(rendered)
    }

    /// Runs the transport. Every error it raises is a failed delivery; the
    /// recorder logs it together with the outcome.
    async fn deliver(
        &self,
        transport: &dyn Transport,
        rendered: &RenderedOutput,
        message: &Message,
    ) -> DeliveryOutcome {
        match transport.deliver(rendered, message).await {
            Ok(delivered) => DeliveryOutcome::finished(delivered),
            Err(NotifyError::Delivery(err)) => DeliveryOutcome::failed(err.level(), error_chain(&err)),
            Err(err) => DeliveryOutcome::failed(LogLevel::Error, error_chain(&err)),
        }
    }
}

/// Renders an error and its sources as `outer: inner: root`.
fn error_chain(err: &dyn std::error::Error) -> String {
    let mut detail = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        detail.push_str(": ");
        detail.push_str(&cause.to_string());
        source = cause.source();
    }
    detail
}
