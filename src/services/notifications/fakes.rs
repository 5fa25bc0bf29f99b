//! Recording collaborators shared by the notifier tests.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use anyhow::anyhow;
use async_trait::async_trait;
use serde_json::Value as JsonValue;

use super::dispatcher::AccessGate;
use super::logging::{LogLevel, NotifyLogger, interpolate};
use super::transport::TransportDefinition;
use crate::external::{
    MailRequest, Mailer, PhoneNumberProvider, PrefixRoutingPhoneNumberProvider, SmsGateway,
    SmsMessage, WebhookClient,
};
use crate::models::{Account, Message, RenderedContent};
use crate::render::Renderer;

#[derive(Default)]
pub struct RecordingLogger {
    events: Mutex<Vec<(LogLevel, String)>>,
}

impl RecordingLogger {
    pub fn events(&self) -> Vec<(LogLevel, String)> {
        self.events.lock().unwrap().clone()
    }

    pub fn count(&self, level: LogLevel) -> usize {
        self.events().iter().filter(|(l, _)| *l == level).count()
    }
}

impl NotifyLogger for RecordingLogger {
    fn log(&self, level: LogLevel, template: &str, fields: &[(&str, String)]) {
        self.events
            .lock()
            .unwrap()
            .push((level, interpolate(template, fields)));
    }
}

pub struct RecordingMailer {
    requests: Mutex<Vec<MailRequest>>,
    failure: Option<String>,
}

impl RecordingMailer {
    pub fn accepting() -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failure: None,
        }
    }

    pub fn failing(reason: &str) -> Self {
        Self {
            requests: Mutex::new(Vec::new()),
            failure: Some(reason.to_string()),
        }
    }

    pub fn requests(&self) -> Vec<MailRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl Mailer for RecordingMailer {
    async fn send_mail(&self, request: &MailRequest) -> anyhow::Result<bool> {
        self.requests.lock().unwrap().push(request.clone());
        match &self.failure {
            Some(reason) => Err(anyhow!("{}", reason)),
            None => Ok(true),
        }
    }
}

#[derive(Default)]
pub struct RecordingGateway {
    queued: Mutex<Vec<SmsMessage>>,
}

impl RecordingGateway {
    pub fn queued(&self) -> Vec<SmsMessage> {
        self.queued.lock().unwrap().clone()
    }
}

#[async_trait]
impl SmsGateway for RecordingGateway {
    fn id(&self) -> &str {
        "recording"
    }

    async fn queue(&self, sms: &SmsMessage) -> anyhow::Result<bool> {
        self.queued.lock().unwrap().push(sms.clone());
        Ok(true)
    }
}

/// Prefix routing in front of a [`RecordingGateway`]
pub struct FakePhoneNumbers {
    inner: PrefixRoutingPhoneNumberProvider,
    gateway: Arc<RecordingGateway>,
}

impl FakePhoneNumbers {
    pub fn routing_all() -> Self {
        Self::with_prefixes(Vec::new())
    }

    pub fn routing(prefix: &str) -> Self {
        Self::with_prefixes(vec![prefix.to_string()])
    }

    fn with_prefixes(prefixes: Vec<String>) -> Self {
        let gateway = Arc::new(RecordingGateway::default());
        Self {
            inner: PrefixRoutingPhoneNumberProvider::new(gateway.clone(), prefixes),
            gateway,
        }
    }

    pub fn gateway(&self) -> &RecordingGateway {
        &self.gateway
    }
}

#[async_trait]
impl PhoneNumberProvider for FakePhoneNumbers {
    async fn verified_number_for(&self, account: &Account) -> anyhow::Result<Option<String>> {
        self.inner.verified_number_for(account).await
    }

    fn route_for(&self, number: &str) -> Option<Arc<dyn SmsGateway>> {
        self.inner.route_for(number)
    }
}

pub struct RecordingWebhook {
    posts: Mutex<Vec<(String, JsonValue)>>,
    result: bool,
}

impl RecordingWebhook {
    pub fn returning(result: bool) -> Self {
        Self {
            posts: Mutex::new(Vec::new()),
            result,
        }
    }

    pub fn posts(&self) -> Vec<(String, JsonValue)> {
        self.posts.lock().unwrap().clone()
    }
}

#[async_trait]
impl WebhookClient for RecordingWebhook {
    async fn post_json(&self, url: &str, body: &JsonValue) -> anyhow::Result<bool> {
        self.posts
            .lock()
            .unwrap()
            .push((url.to_string(), body.clone()));
        Ok(self.result)
    }
}

/// Renders `"<view mode>:<bundle>"`, or a fixed text per view mode
#[derive(Default)]
pub struct CountingRenderer {
    calls: AtomicUsize,
    overrides: Vec<(String, RenderedContent)>,
    failing: Option<String>,
}

impl CountingRenderer {
    pub fn with_content(mut self, view_mode: &str, content: RenderedContent) -> Self {
        self.overrides.push((view_mode.to_string(), content));
        self
    }

    pub fn failing_on(mut self, view_mode: &str) -> Self {
        self.failing = Some(view_mode.to_string());
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl Renderer for CountingRenderer {
    fn render(&self, message: &Message, view_mode: &str) -> anyhow::Result<RenderedContent> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.as_deref() == Some(view_mode) {
            return Err(anyhow!("template for {} is broken", view_mode));
        }
        Ok(self
            .overrides
            .iter()
            .find(|(mode, _)| mode == view_mode)
            .map(|(_, content)| content.clone())
            .unwrap_or_else(|| RenderedContent::plain(format!("{}:{}", view_mode, message.bundle))))
    }
}

pub struct DenyAll;

impl AccessGate for DenyAll {
    fn can_access(&self, _definition: &TransportDefinition, _message: &Message) -> bool {
        false
    }
}
