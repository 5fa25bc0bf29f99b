//! Configuration validation logic
//!
//! This module provides validation methods for all configuration structures
//! to ensure configuration values are within acceptable ranges and formats.

use std::collections::HashSet;

use validator::Validate;

use crate::config::error::ConfigError;
use crate::config::settings::{
    FileSettings, LoggerSettings, NotifierSettings, Settings, SmsSettings, SmtpSettings,
    WebhookSettings,
};
use crate::render::MessageTemplate;
use crate::services::notifications::TransportKind;

/// Valid log levels
const VALID_LOG_LEVELS: &[&str] = &["trace", "debug", "info", "warn", "error"];

/// Valid log formats
const VALID_LOG_FORMATS: &[&str] = &["full", "compact", "json"];

/// Checks that `url` is an absolute http(s) URL.
fn validate_http_url(field: &str, url: &str) -> Result<(), ConfigError> {
    match reqwest::Url::parse(url) {
        Ok(parsed) if matches!(parsed.scheme(), "http" | "https") => Ok(()),
        Ok(parsed) => Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: format!("Unsupported URL scheme '{}'. Expected http or https.", parsed.scheme()),
        }),
        Err(e) => Err(ConfigError::ValidationError {
            field: field.to_string(),
            message: format!("Invalid URL '{}': {}", url, e),
        }),
    }
}

impl FileSettings {
    fn validate(&self) -> Result<(), ConfigError> {
        if self.enabled && self.path.trim().is_empty() {
            return Err(ConfigError::validation(
                "logger.file.path",
                "File path is required when file logging is enabled.",
            ));
        }

        if !VALID_LOG_FORMATS.contains(&self.format.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: format!(
                    "Invalid log format '{}'. Valid formats are: {}",
                    self.format,
                    VALID_LOG_FORMATS.join(", ")
                ),
            });
        }

        Ok(())
    }
}

impl LoggerSettings {
    /// Validate logger settings
    ///
    /// # Validation Rules
    /// - Log level must be one of: trace, debug, info, warn, error
    /// - If file logging is enabled, path must not be empty
    /// - Log format must be one of: full, compact, json
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !VALID_LOG_LEVELS.contains(&self.level.to_lowercase().as_str()) {
            return Err(ConfigError::ValidationError {
                field: "logger.level".to_string(),
                message: format!(
                    "Invalid log level '{}'. Valid levels are: {}",
                    self.level,
                    VALID_LOG_LEVELS.join(", ")
                ),
            });
        }

        self.file.validate()?;

        Ok(())
    }
}

impl WebhookSettings {
    fn check(&self) -> Result<(), ConfigError> {
        if let Some(url) = &self.url {
            validate_http_url("notifier.webhook.url", url)?;
        }

        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "notifier.webhook.timeout_seconds",
                "Webhook timeout must be greater than 0 seconds.",
            ));
        }

        Ok(())
    }
}

impl SmtpSettings {
    /// Runs the derived field rules and reports the first failure.
    fn check(&self) -> Result<(), ConfigError> {
        let Err(errors) = Validate::validate(self) else {
            return Ok(());
        };

        let mut field_errors: Vec<_> = errors.field_errors().into_iter().collect();
        field_errors.sort_by(|a, b| a.0.cmp(&b.0));

        match field_errors.first() {
            Some((field, errs)) => {
                let message = errs
                    .first()
                    .map(|e| {
                        e.message
                            .as_ref()
                            .map(|m| m.to_string())
                            .unwrap_or_else(|| e.code.to_string())
                    })
                    .unwrap_or_default();
                Err(ConfigError::ValidationError {
                    field: format!("notifier.smtp.{}", field),
                    message,
                })
            }
            None => Err(ConfigError::validation(
                "notifier.smtp".to_string(),
                errors.to_string(),
            )),
        }
    }
}

impl SmsSettings {
    fn check(&self) -> Result<(), ConfigError> {
        validate_http_url("notifier.sms.gateway_url", &self.gateway_url)?;

        if self.timeout_seconds == 0 {
            return Err(ConfigError::validation(
                "notifier.sms.timeout_seconds",
                "SMS gateway timeout must be greater than 0 seconds.",
            ));
        }

        if let Some(prefix) = self.route_prefixes.iter().find(|p| p.trim().is_empty()) {
            return Err(ConfigError::ValidationError {
                field: "notifier.sms.route_prefixes".to_string(),
                message: format!("Route prefix '{}' cannot be blank.", prefix),
            });
        }

        Ok(())
    }
}

impl MessageTemplate {
    fn check(&self, index: usize) -> Result<(), ConfigError> {
        let field = format!("notifier.templates[{}]", index);

        if self.bundle.trim().is_empty() {
            return Err(ConfigError::validation(
                format!("{}.bundle", field),
                "Template bundle cannot be empty.".to_string(),
            ));
        }

        for (view_mode, partial) in &self.view_modes {
            if *partial >= self.partials.len() {
                return Err(ConfigError::ValidationError {
                    field: format!("{}.view_modes.{}", field, view_mode),
                    message: format!(
                        "Partial index {} is out of range; bundle '{}' has {} partials.",
                        partial,
                        self.bundle,
                        self.partials.len()
                    ),
                });
            }
        }

        Ok(())
    }
}

impl NotifierSettings {
    /// Validate notifier settings
    ///
    /// # Validation Rules
    /// - The default transport must be a known transport id
    /// - Template bundles must be unique and view modes must point at existing partials
    /// - Webhook and SMS gateway URLs must be http(s) URLs
    /// - SMTP settings must pass their field rules
    pub fn validate(&self) -> Result<(), ConfigError> {
        if TransportKind::from_id(&self.default_transport).is_none() {
            let known: Vec<&str> = TransportKind::ALL.iter().map(|k| k.id()).collect();
            return Err(ConfigError::ValidationError {
                field: "notifier.default_transport".to_string(),
                message: format!(
                    "Unknown transport '{}'. Known transports are: {}",
                    self.default_transport,
                    known.join(", ")
                ),
            });
        }

        let mut bundles = HashSet::new();
        for (index, template) in self.templates.iter().enumerate() {
            template.check(index)?;
            if !bundles.insert(template.bundle.as_str()) {
                return Err(ConfigError::ValidationError {
                    field: format!("notifier.templates[{}].bundle", index),
                    message: format!("Duplicate template for bundle '{}'.", template.bundle),
                });
            }
        }

        if let Some(webhook) = &self.webhook {
            webhook.check()?;
        }
        if let Some(smtp) = &self.smtp {
            smtp.check()?;
        }
        if let Some(sms) = &self.sms {
            sms.check()?;
        }

        Ok(())
    }
}

impl Settings {
    /// Validate all configuration settings
    ///
    /// This method validates all sub-configurations and returns the first
    /// validation error encountered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.logger.validate()?;
        self.notifier.validate()?;
        Ok(())
    }
}
