//! Log sink for pipeline events.
//!
//! The dispatcher and transports report through [`NotifyLogger`] rather than
//! calling `tracing` directly, so tests can observe exactly which events a
//! dispatch produced.

use std::sync::LazyLock;

use regex::{Captures, Regex};

static PLACEHOLDER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{([a-z_]+)\}").expect("placeholder pattern is valid"));

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warn,
    Error,
}

/// Structured event sink.
///
/// `template` may contain `{name}` placeholders that refer to entries in
/// `fields`.
pub trait NotifyLogger: Send + Sync {
    fn log(&self, level: LogLevel, template: &str, fields: &[(&str, String)]);

    fn info(&self, template: &str, fields: &[(&str, String)]) {
        self.log(LogLevel::Info, template, fields);
    }

    fn warn(&self, template: &str, fields: &[(&str, String)]) {
        self.log(LogLevel::Warn, template, fields);
    }

    fn error(&self, template: &str, fields: &[(&str, String)]) {
        self.log(LogLevel::Error, template, fields);
    }
}

/// Replaces `{name}` placeholders with field values. Unknown placeholders are
/// left as they are.
pub fn interpolate(template: &str, fields: &[(&str, String)]) -> String {
    PLACEHOLDER
        .replace_all(template, |caps: &Captures<'_>| {
            fields
                .iter()
                .find(|(name, _)| *name == &caps[1])
                .map(|(_, value)| value.clone())
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Forwards events to `tracing` under the `message_notify` target
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl NotifyLogger for TracingLogger {
    fn log(&self, level: LogLevel, template: &str, fields: &[(&str, String)]) {
        let message = interpolate(template, fields);
        match level {
            LogLevel::Info => tracing::info!(target: "message_notify", "{}", message),
            LogLevel::Warn => tracing::warn!(target: "message_notify", "{}", message),
            LogLevel::Error => tracing::error!(target: "message_notify", "{}", message),
        }
    }
}
