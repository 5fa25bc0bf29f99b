//! Transport definitions and the delivery trait.

use async_trait::async_trait;

use crate::error::NotifyResult;
use crate::models::{Message, RenderedOutput};

/// Closed set of delivery channels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportKind {
    Email,
    /// SMS to the verified number of the message owner
    Sms,
    /// SMS to a number given in the options or on the message
    SmsNumber,
    Webhook,
    Test,
}

/// Static metadata describing a transport
#[derive(Debug, PartialEq, Eq)]
pub struct TransportDefinition {
    pub kind: TransportKind,
    pub id: &'static str,
    pub title: &'static str,
    pub description: &'static str,
    /// View modes rendered before delivery, in order
    pub view_modes: &'static [&'static str],
}

static EMAIL: TransportDefinition = TransportDefinition {
    kind: TransportKind::Email,
    id: "email",
    title: "Email",
    description: "Send messages via email",
    view_modes: &["mail_subject", "mail_body"],
};

static SMS: TransportDefinition = TransportDefinition {
    kind: TransportKind::Sms,
    id: "sms",
    title: "SMS",
    description: "Send messages via SMS to the message owner",
    view_modes: &["sms_body"],
};

static SMS_NUMBER: TransportDefinition = TransportDefinition {
    kind: TransportKind::SmsNumber,
    id: "sms_number",
    title: "SMS to phone number",
    description: "Send messages via SMS to a given phone number",
    view_modes: &["sms_body"],
};

static WEBHOOK: TransportDefinition = TransportDefinition {
    kind: TransportKind::Webhook,
    id: "webhook",
    title: "Chat webhook",
    description: "Post messages to a chat incoming webhook",
    view_modes: &["body"],
};

static TEST: TransportDefinition = TransportDefinition {
    kind: TransportKind::Test,
    id: "test",
    title: "Test",
    description: "Records the rendered output on the message",
    view_modes: &["foo", "bar"],
};

impl TransportKind {
    pub const ALL: [TransportKind; 5] = [
        TransportKind::Email,
        TransportKind::Sms,
        TransportKind::SmsNumber,
        TransportKind::Webhook,
        TransportKind::Test,
    ];

    pub fn definition(&self) -> &'static TransportDefinition {
        match self {
            TransportKind::Email => &EMAIL,
            TransportKind::Sms => &SMS,
            TransportKind::SmsNumber => &SMS_NUMBER,
            TransportKind::Webhook => &WEBHOOK,
            TransportKind::Test => &TEST,
        }
    }

    pub fn id(&self) -> &'static str {
        self.definition().id
    }

    /// Exact, case-sensitive lookup by transport id.
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl std::fmt::Display for TransportKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

/// A delivery channel instantiated with its merged options.
///
/// `deliver` receives every declared view mode already rendered. It must not
/// touch persisted message state; the only thing it may record on the
/// message is the transient output.
#[async_trait]
pub trait Transport: Send + Sync {
    fn definition(&self) -> &'static TransportDefinition;

    fn view_modes(&self) -> &'static [&'static str] {
        self.definition().view_modes
    }

    fn can_access(&self, _message: &Message) -> bool {
        true
    }

    async fn deliver(&self, rendered: &RenderedOutput, message: &Message) -> NotifyResult<bool>;
}
