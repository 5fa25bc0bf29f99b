//! Post-delivery bookkeeping: logging, rendered-field persistence and the
//! save decision.

use std::sync::Arc;

use super::logging::{LogLevel, NotifyLogger};
use super::options::CommonOptions;
use super::transport::TransportDefinition;
use crate::error::{NotifyError, NotifyResult};
use crate::models::{FieldKind, FieldValue, Message, RenderedOutput};
use crate::repositories::Storage;

/// What came back from a transport's `deliver`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryOutcome {
    pub delivered: bool,
    /// Set when `deliver` raised instead of returning a result
    pub failure: Option<DeliveryFailure>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryFailure {
    pub level: LogLevel,
    pub detail: String,
}

impl DeliveryOutcome {
    pub fn finished(delivered: bool) -> Self {
        Self {
            delivered,
            failure: None,
        }
    }

    pub fn failed(level: LogLevel, detail: impl Into<String>) -> Self {
        Self {
            delivered: false,
            failure: Some(DeliveryFailure {
                level,
                detail: detail.into(),
            }),
        }
    }
}

pub struct OutcomeRecorder {
    storage: Arc<dyn Storage>,
    logger: Arc<dyn NotifyLogger>,
}

impl OutcomeRecorder {
    pub fn new(storage: Arc<dyn Storage>, logger: Arc<dyn NotifyLogger>) -> Self {
        Self { storage, logger }
    }

    pub async fn post_process(
        &self,
        outcome: &DeliveryOutcome,
        rendered: &RenderedOutput,
        message: &mut Message,
        options: &CommonOptions,
        definition: &TransportDefinition,
    ) -> NotifyResult<()> {
        let delivered = outcome.delivered;
        self.log_outcome(outcome, message, options, definition);

        if let Some(mapping) = &options.rendered_fields {
            let values = self
                .resolve_fields(mapping, rendered, message, definition)
                .await?;
            for (field, value) in values {
                message.set_field(field, value);
            }
        }

        if options.should_save(delivered) {
            self.storage
                .save_message(message)
                .await
                .map_err(|e| NotifyError::storage("save message", e))?;
        }

        Ok(())
    }

    /// Emits at most one event per send. A raised delivery failure is always
    /// reported, at its own level; a plain `false` only with `log-on-fail`.
    fn log_outcome(
        &self,
        outcome: &DeliveryOutcome,
        message: &Message,
        options: &CommonOptions,
        definition: &TransportDefinition,
    ) {
        let mut fields = vec![
            ("title", definition.title.to_string()),
            ("uid", message.owner_label()),
        ];

        match &outcome.failure {
            Some(failure) => {
                fields.push(("error", failure.detail.clone()));
                self.logger.log(
                    failure.level,
                    "Could not send message using {title} to user ID {uid}: {error}",
                    &fields,
                );
            }
            None if !outcome.delivered && options.log_on_fail => {
                self.logger.error(
                    "Could not send message using {title} to user ID {uid}.",
                    &fields,
                );
            }
            None if outcome.delivered && options.log_on_success => {
                self.logger
                    .info("Sent message using {title} to user ID {uid}.", &fields);
            }
            None => {}
        }
    }

    /// Computes every destination value before anything is written, so a bad
    /// mapping leaves the message untouched.
    async fn resolve_fields(
        &self,
        mapping: &std::collections::BTreeMap<String, String>,
        rendered: &RenderedOutput,
        message: &Message,
        definition: &TransportDefinition,
    ) -> NotifyResult<Vec<(String, FieldValue)>> {
        let mut values = Vec::with_capacity(definition.view_modes.len());

        for view_mode in definition.view_modes {
            let field = mapping
                .get(*view_mode)
                .ok_or_else(|| NotifyError::MissingFieldMapping {
                    view_mode: view_mode.to_string(),
                })?;

            let field_definition = self
                .storage
                .field_definition(&message.bundle, field)
                .await
                .map_err(|e| NotifyError::storage(format!("look up field {}", field), e))?
                .ok_or_else(|| NotifyError::UnknownField {
                    bundle: message.bundle.clone(),
                    field: field.clone(),
                })?;

            let text = rendered.require(view_mode)?.text.clone();
            let value = match field_definition.kind {
                FieldKind::FormattedText { default_format } => {
                    let format = message
                        .field(field)
                        .and_then(FieldValue::format)
                        .map(str::to_string)
                        .unwrap_or(default_format);
                    FieldValue::formatted(text, format)
                }
                FieldKind::PlainText => FieldValue::plain(text),
            };

            values.push((field.clone(), value));
        }

        Ok(values)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use super::*;
    use crate::models::{FieldDefinition, RenderedContent};
    use crate::repositories::MemoryStorage;
    use crate::services::notifications::fakes::RecordingLogger;
    use crate::services::notifications::transport::TransportKind;

    fn setup() -> (Arc<MemoryStorage>, Arc<RecordingLogger>, OutcomeRecorder) {
        let storage = Arc::new(MemoryStorage::new());
        storage.define_field("test", FieldDefinition::plain("rendered_foo"));
        storage.define_field("test", FieldDefinition::formatted("rendered_bar", "plain_text"));
        let logger = Arc::new(RecordingLogger::default());
        let recorder = OutcomeRecorder::new(storage.clone(), logger.clone());
        (storage, logger, recorder)
    }

    fn rendered() -> RenderedOutput {
        let mut output = RenderedOutput::new();
        output.insert("foo", RenderedContent::plain("foo text"));
        output.insert("bar", RenderedContent::plain("bar text"));
        output
    }

    fn mapping(pairs: &[(&str, &str)]) -> CommonOptions {
        CommonOptions {
            rendered_fields: Some(
                pairs
                    .iter()
                    .map(|(k, v)| (k.to_string(), v.to_string()))
                    .collect::<BTreeMap<_, _>>(),
            ),
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_failure_logged_once_with_owner() {
        let (storage, logger, recorder) = setup();
        let mut message = Message::new("test").with_owner(5);
        let definition = TransportKind::Test.definition();

        recorder
            .post_process(&DeliveryOutcome::finished(false), &rendered(), &mut message, &CommonOptions::default(), definition)
            .await
            .unwrap();

        assert_eq!(
            logger.events(),
            [(
                LogLevel::Error,
                "Could not send message using Test to user ID 5.".to_string()
            )]
        );
        assert_eq!(storage.save_count(), 0);
    }

    #[tokio::test]
    async fn test_raised_failure_is_one_event_at_its_level() {
        let (_, logger, recorder) = setup();
        let mut message = Message::new("test").with_owner(5);
        let options = CommonOptions {
            log_on_fail: false,
            ..Default::default()
        };
        let outcome = DeliveryOutcome::failed(LogLevel::Warn, "Failed to send SMS. Message empty.");

        recorder
            .post_process(&outcome, &rendered(), &mut message, &options, TransportKind::SmsNumber.definition())
            .await
            .unwrap();

        let events = logger.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].0, LogLevel::Warn);
        assert!(events[0].1.ends_with("to user ID 5: Failed to send SMS. Message empty."));
    }

    #[tokio::test]
    async fn test_success_logging_is_opt_in() {
        let (storage, logger, recorder) = setup();
        let definition = TransportKind::Email.definition();
        let mut message = Message::new("test");

        recorder
            .post_process(&DeliveryOutcome::finished(true), &rendered(), &mut message, &CommonOptions::default(), definition)
            .await
            .unwrap();
        assert!(logger.events().is_empty());
        assert_eq!(storage.save_count(), 1);

        let options = CommonOptions {
            log_on_success: true,
            ..Default::default()
        };
        recorder
            .post_process(&DeliveryOutcome::finished(true), &rendered(), &mut message, &options, definition)
            .await
            .unwrap();
        assert_eq!(
            logger.events(),
            [(
                LogLevel::Info,
                "Sent message using Email to user ID 0.".to_string()
            )]
        );
    }

    #[tokio::test]
    async fn test_rendered_fields_respect_existing_format() {
        let (storage, _, recorder) = setup();
        let mut message =
            Message::new("test").with_field("rendered_bar", FieldValue::formatted("", "full_html"));

        recorder
            .post_process(
                &DeliveryOutcome::finished(true),
                &rendered(),
                &mut message,
                &mapping(&[("foo", "rendered_foo"), ("bar", "rendered_bar")]),
                TransportKind::Test.definition(),
            )
            .await
            .unwrap();

        assert_eq!(message.field("rendered_foo"), Some(&FieldValue::plain("foo text")));
        assert_eq!(
            message.field("rendered_bar"),
            Some(&FieldValue::formatted("bar text", "full_html"))
        );
        let saved = storage.message(message.id.unwrap()).unwrap();
        assert_eq!(saved.field("rendered_foo"), Some(&FieldValue::plain("foo text")));
    }

    #[tokio::test]
    async fn test_unknown_field_leaves_message_untouched() {
        let (storage, _, recorder) = setup();
        let mut message = Message::new("test");

        let err = recorder
            .post_process(
                &DeliveryOutcome::finished(true),
                &rendered(),
                &mut message,
                &mapping(&[("foo", "rendered_foo"), ("bar", "rendered_baz")]),
                TransportKind::Test.definition(),
            )
            .await
            .unwrap_err();

        match err {
            NotifyError::UnknownField { bundle, field } => {
                assert_eq!(bundle, "test");
                assert_eq!(field, "rendered_baz");
            }
            other => panic!("expected UnknownField, got {:?}", other),
        }
        assert!(message.fields.is_empty());
        assert_eq!(storage.save_count(), 0);
    }
}
