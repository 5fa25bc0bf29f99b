//! Message and field models.
//!
//! A [`Message`] is the source record of a notification. It is owned by the
//! calling application; the dispatcher only borrows it for one `send` call.

use std::collections::BTreeMap;
use std::sync::{Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use super::rendered::RenderedOutput;

pub type MessageId = u64;

pub type AccountId = u64;

fn default_language() -> String {
    "en".to_string()
}

// ============================================================================
// Field values
// ============================================================================

/// Value stored in a message field
///
/// Plain values serialize as a bare string, formatted values as
/// `{"value": ..., "format": ...}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Plain(String),
    Formatted { value: String, format: String },
}

impl FieldValue {
    pub fn plain(value: impl Into<String>) -> Self {
        FieldValue::Plain(value.into())
    }

    pub fn formatted(value: impl Into<String>, format: impl Into<String>) -> Self {
        FieldValue::Formatted {
            value: value.into(),
            format: format.into(),
        }
    }

    pub fn value(&self) -> &str {
        match self {
            FieldValue::Plain(value) => value,
            FieldValue::Formatted { value, .. } => value,
        }
    }

    pub fn format(&self) -> Option<&str> {
        match self {
            FieldValue::Plain(_) => None,
            FieldValue::Formatted { format, .. } => Some(format),
        }
    }
}

/// Schema of a field attached to a message bundle
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDefinition {
    pub name: String,
    #[serde(flatten)]
    pub kind: FieldKind,
}

impl FieldDefinition {
    pub fn plain(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::PlainText,
        }
    }

    pub fn formatted(name: impl Into<String>, default_format: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: FieldKind::FormattedText {
                default_format: default_format.into(),
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FieldKind {
    PlainText,
    FormattedText { default_format: String },
}

// ============================================================================
// Message
// ============================================================================

/// Last rendered output handed to a transport.
///
/// Transient: never serialized, and written through a shared reference so
/// that transports can record it without mutating the persisted message.
#[derive(Debug, Default)]
pub struct TransientOutput(Mutex<Option<RenderedOutput>>);

impl TransientOutput {
    fn set(&self, output: RenderedOutput) {
        *self.0.lock().unwrap_or_else(PoisonError::into_inner) = Some(output);
    }

    fn get(&self) -> Option<RenderedOutput> {
        self.0.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl Clone for TransientOutput {
    fn clone(&self) -> Self {
        Self(Mutex::new(self.get()))
    }
}

/// Notification source record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// Assigned by storage on first save
    #[serde(default)]
    pub id: Option<MessageId>,
    /// Owning account, `None` for anonymous messages
    #[serde(default)]
    pub owner: Option<AccountId>,
    /// Message type; selects templates and field definitions
    pub bundle: String,
    #[serde(default)]
    pub fields: BTreeMap<String, FieldValue>,
    #[serde(default = "default_language")]
    pub language: String,
    /// Result flag consumed by the test transport
    #[serde(skip)]
    pub fail: bool,
    #[serde(skip)]
    output: TransientOutput,
}

impl Message {
    pub fn new(bundle: impl Into<String>) -> Self {
        Self {
            id: None,
            owner: None,
            bundle: bundle.into(),
            fields: BTreeMap::new(),
            language: default_language(),
            fail: false,
            output: TransientOutput::default(),
        }
    }

    pub fn with_owner(mut self, owner: AccountId) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    pub fn with_field(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.fields.insert(name.into(), value);
        self
    }

    pub fn failing(mut self) -> Self {
        self.fail = true;
        self
    }

    pub fn is_new(&self) -> bool {
        self.id.is_none()
    }

    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }

    pub fn set_field(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    /// Rendered output recorded by the last test-transport delivery.
    pub fn output(&self) -> Option<RenderedOutput> {
        self.output.get()
    }

    pub fn record_output(&self, output: RenderedOutput) {
        self.output.set(output);
    }

    /// Owner id as it appears in log events.
    pub fn owner_label(&self) -> String {
        self.owner
            .map(|id| id.to_string())
            .unwrap_or_else(|| "0".to_string())
    }
}

/// Account owning a message
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: AccountId,
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub preferred_language: Option<String>,
    #[serde(default)]
    pub phone_number: Option<String>,
    #[serde(default)]
    pub phone_verified: bool,
}

impl Account {
    pub fn new(id: AccountId, name: impl Into<String>, email: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            email: email.into(),
            preferred_language: None,
            phone_number: None,
            phone_verified: false,
        }
    }

    pub fn with_preferred_language(mut self, language: impl Into<String>) -> Self {
        self.preferred_language = Some(language.into());
        self
    }

    pub fn with_verified_phone(mut self, number: impl Into<String>) -> Self {
        self.phone_number = Some(number.into());
        self.phone_verified = true;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::RenderedContent;

    #[test]
    fn test_field_value_json_shapes() {
        let plain: FieldValue = serde_json::from_str(r#""hello""#).unwrap();
        assert_eq!(plain, FieldValue::plain("hello"));

        let formatted: FieldValue =
            serde_json::from_str(r#"{"value": "<p>hi</p>", "format": "basic_html"}"#).unwrap();
        assert_eq!(formatted.value(), "<p>hi</p>");
        assert_eq!(formatted.format(), Some("basic_html"));
    }

    #[test]
    fn test_message_deserialize_skips_transient_state() {
        let json = r#"{
            "owner": 7,
            "bundle": "order_shipped",
            "fields": {"sms_number": "+15550100"}
        }"#;
        let message: Message = serde_json::from_str(json).unwrap();
        assert!(message.is_new());
        assert_eq!(message.owner, Some(7));
        assert_eq!(message.language, "en");
        assert!(!message.fail);
        assert!(message.output().is_none());

        let serialized = serde_json::to_value(&message).unwrap();
        assert!(serialized.get("fail").is_none());
        assert!(serialized.get("output").is_none());
    }

    #[test]
    fn test_recorded_output_survives_clone() {
        let message = Message::new("test");
        let mut output = RenderedOutput::new();
        output.insert("foo", RenderedContent::plain("first"));
        message.record_output(output);

        let copy = message.clone();
        assert_eq!(copy.output().unwrap().text("foo"), Some("first"));
    }

    #[test]
    fn test_owner_label() {
        assert_eq!(Message::new("test").owner_label(), "0");
        assert_eq!(Message::new("test").with_owner(12).owner_label(), "12");
    }

    #[test]
    fn test_field_definition_kind_from_json() {
        let def: FieldDefinition = serde_json::from_str(
            r#"{"name": "rendered_baz", "type": "formatted_text", "default_format": "full_html"}"#,
        )
        .unwrap();
        assert_eq!(def, FieldDefinition::formatted("rendered_baz", "full_html"));

        let def: FieldDefinition =
            serde_json::from_str(r#"{"name": "rendered_foo", "type": "plain_text"}"#).unwrap();
        assert_eq!(def, FieldDefinition::plain("rendered_foo"));
    }
}
