//! Configuration settings structures for message-notify
//!
//! This module defines all configuration structures that can be loaded from
//! TOML files and environment variables.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::config::error::ConfigError;
use crate::logger::{ConsoleConfig, FileConfig, LogFormat, LoggerConfig};
use crate::render::MessageTemplate;

// ============================================================================
// Default value functions
// ============================================================================

fn default_app_name() -> String {
    "message-notify".to_string()
}

fn default_app_version() -> String {
    crate::pkg_version().to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}

fn default_log_path() -> String {
    "logs/message-notify.log".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_transport() -> String {
    "email".to_string()
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_smtp_host() -> String {
    "localhost".to_string()
}

fn default_smtp_port() -> u16 {
    1025
}

fn default_from_email() -> String {
    "noreply@localhost".to_string()
}

fn default_from_name() -> String {
    "Message Notify".to_string()
}

// ============================================================================
// Application Configuration
// ============================================================================

/// Application basic information configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Application name
    #[serde(default = "default_app_name")]
    pub name: String,

    /// Application version
    #[serde(default = "default_app_version")]
    pub version: String,
}

impl Default for ApplicationConfig {
    fn default() -> Self {
        Self {
            name: default_app_name(),
            version: default_app_version(),
        }
    }
}

// ============================================================================
// Logger Settings
// ============================================================================

/// Console output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsoleSettings {
    /// Whether console output is enabled
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Whether to use colored output
    #[serde(default = "default_true")]
    pub colored: bool,
}

impl Default for ConsoleSettings {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            colored: default_true(),
        }
    }
}

/// File output settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileSettings {
    /// Whether file output is enabled
    #[serde(default)]
    pub enabled: bool,

    /// Path to the log file
    #[serde(default = "default_log_path")]
    pub path: String,

    /// Whether to append to an existing file instead of truncating it
    #[serde(default = "default_true")]
    pub append: bool,

    /// Log format: "full", "compact", or "json"
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for FileSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            path: default_log_path(),
            append: default_true(),
            format: default_log_format(),
        }
    }
}

/// Logger configuration settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoggerSettings {
    /// Log level: "trace", "debug", "info", "warn", "error"
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default)]
    pub console: ConsoleSettings,

    #[serde(default)]
    pub file: FileSettings,
}

impl Default for LoggerSettings {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            console: ConsoleSettings::default(),
            file: FileSettings::default(),
        }
    }
}

impl LoggerSettings {
    /// Convert LoggerSettings to the runtime LoggerConfig
    pub fn into_logger_config(self) -> Result<LoggerConfig, ConfigError> {
        let config = LoggerConfig {
            console: ConsoleConfig {
                enabled: self.console.enabled,
                colored: self.console.colored,
            },
            file: self.file.into_file_config()?,
            level: self.level,
        };

        config.validate().map_err(|e| ConfigError::ValidationError {
            field: "logger".to_string(),
            message: e.to_string(),
        })?;
        Ok(config)
    }
}

impl FileSettings {
    /// Convert FileSettings to FileConfig
    pub fn into_file_config(self) -> Result<FileConfig, ConfigError> {
        let config = FileConfig {
            enabled: self.enabled,
            format: self.parse_format()?,
            path: PathBuf::from(self.path),
            append: self.append,
        };

        config.validate().map_err(|e| ConfigError::ValidationError {
            field: "logger.file".to_string(),
            message: e.to_string(),
        })?;
        Ok(config)
    }

    fn parse_format(&self) -> Result<LogFormat, ConfigError> {
        self.format
            .parse::<LogFormat>()
            .map_err(|e| ConfigError::ValidationError {
                field: "logger.file.format".to_string(),
                message: e.to_string(),
            })
    }
}

// ============================================================================
// Notifier Configuration
// ============================================================================

/// Chat webhook transport settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebhookSettings {
    /// Default `webhook-url` option for the webhook transport
    #[serde(default)]
    pub url: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for WebhookSettings {
    fn default() -> Self {
        Self {
            url: None,
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// SMTP server used by the email transport
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Validate)]
pub struct SmtpSettings {
    #[serde(default = "default_smtp_host")]
    #[validate(length(min = 1, message = "SMTP host cannot be empty"))]
    pub host: String,

    #[serde(default = "default_smtp_port")]
    #[validate(range(min = 1, message = "SMTP port must be between 1 and 65535"))]
    pub port: u16,

    #[serde(default = "default_from_email")]
    #[validate(email(message = "Invalid sender email format"))]
    pub from_email: String,

    #[serde(default = "default_from_name")]
    pub from_name: String,

    /// Optional for local servers like Mailpit
    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,

    /// Plain SMTP when false
    #[serde(default)]
    pub use_tls: bool,
}

impl Default for SmtpSettings {
    fn default() -> Self {
        Self {
            host: default_smtp_host(),
            port: default_smtp_port(),
            from_email: default_from_email(),
            from_name: default_from_name(),
            username: None,
            password: None,
            use_tls: false,
        }
    }
}

/// HTTP SMS gateway settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SmsSettings {
    /// Endpoint receiving `{"recipients": [...], "body": "..."}`
    #[serde(default)]
    pub gateway_url: String,

    /// Number prefixes routed to the gateway; empty routes every number
    #[serde(default)]
    pub route_prefixes: Vec<String>,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

impl Default for SmsSettings {
    fn default() -> Self {
        Self {
            gateway_url: String::new(),
            route_prefixes: Vec::new(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

/// Notifier pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NotifierSettings {
    /// Transport used when sending a message to its owner
    #[serde(default = "default_transport")]
    pub default_transport: String,

    /// Message templates, one per bundle
    #[serde(default)]
    pub templates: Vec<MessageTemplate>,

    #[serde(default)]
    pub webhook: Option<WebhookSettings>,

    #[serde(default)]
    pub smtp: Option<SmtpSettings>,

    #[serde(default)]
    pub sms: Option<SmsSettings>,
}

impl Default for NotifierSettings {
    fn default() -> Self {
        Self {
            default_transport: default_transport(),
            templates: Vec::new(),
            webhook: None,
            smtp: None,
            sms: None,
        }
    }
}

// ============================================================================
// Main Settings Structure
// ============================================================================

/// Complete application settings
///
/// This structure represents the entire configuration that can be loaded
/// from TOML files and environment variables.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Settings {
    #[serde(default)]
    pub application: ApplicationConfig,

    #[serde(default)]
    pub logger: LoggerSettings,

    #[serde(default)]
    pub notifier: NotifierSettings,
}
