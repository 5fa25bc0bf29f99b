//! CLI argument parsing with clap
//!
//! This module defines the command-line interface structure using clap,
//! including all commands, arguments, and their documentation.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use serde_json::Value as JsonValue;

/// Dispatch notification messages through pluggable transports
#[derive(Parser, Debug)]
#[command(name = "message-notify")]
#[command(about = "Dispatch notification messages through pluggable transports")]
#[command(long_about = "
message-notify renders a message for a transport (email, SMS, chat webhook or
the recording test transport), attempts delivery once and records the outcome.

EXAMPLES:
    # List the registered transports
    message-notify transports

    # Send a message through the test transport
    message-notify send --transport test --message message.json

    # Send to a chat webhook, overriding the configured URL
    message-notify send --transport webhook --message alert.json \\
        --option webhook-url=https://hooks.example.com/T0/B0

    # Keep the rendered body on the message
    message-notify send --transport test --message message.json \\
        --option 'rendered-fields={\"foo\":\"rendered_foo\",\"bar\":\"rendered_bar\"}'

    # Use a custom configuration file with verbose logging
    message-notify --config /etc/message-notify/production.toml --verbose transports
")]
#[command(version = crate::clap_long_version())]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Commands>,

    /// Configuration file path
    ///
    /// Load this single TOML file instead of the layered configuration
    /// directory. The file must exist and be readable.
    ///
    /// Example: --config /etc/message-notify/production.toml
    #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_file_path)]
    pub config: Option<PathBuf>,

    /// Override environment detection
    ///
    /// Selects which `config/{env}.toml` layer is loaded.
    ///
    /// Available values: development (dev), staging, production (prod), test
    #[arg(short, long, value_enum)]
    pub env: Option<Environment>,

    /// Enable verbose logging
    ///
    /// Cannot be used with --quiet.
    #[arg(short, long)]
    pub verbose: bool,

    /// Suppress non-error output
    ///
    /// Cannot be used with --verbose.
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level override
    ///
    /// Takes precedence over the configuration file and over --verbose/--quiet.
    #[arg(long, value_enum)]
    pub log_level: Option<LogLevel>,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List registered transports (default)
    ///
    /// Prints every transport id with its title, the view modes it renders
    /// and whether the collaborator it needs is configured.
    Transports,

    /// Send one message through a transport
    ///
    /// The message file is JSON with `bundle`, optional `owner`, `language`
    /// and `fields`. An inline `owner_account` object is seeded into storage
    /// before sending.
    ///
    /// Examples:
    ///   message-notify send -t test -m message.json
    ///   message-notify send -t sms_number -m sms.json -o phone-number=+15550100
    Send {
        /// Transport id (email, sms, sms_number, webhook, test)
        #[arg(short, long, value_name = "ID")]
        transport: String,

        /// Path of the JSON message file
        #[arg(short, long, value_name = "FILE", value_parser = super::validation::validate_file_path)]
        message: PathBuf,

        /// Dispatch option as key=value; values are parsed as JSON when
        /// possible and taken as strings otherwise
        #[arg(short, long = "option", value_name = "KEY=VALUE", value_parser = super::validation::parse_option)]
        options: Vec<(String, JsonValue)>,
    },
}

/// Environment options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum Environment {
    #[value(name = "development", alias = "dev")]
    Development,
    #[value(name = "staging")]
    Staging,
    #[value(name = "production", alias = "prod")]
    Production,
    #[value(name = "test")]
    Test,
}

/// Log level options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum LogLevel {
    #[value(name = "error")]
    Error,
    #[value(name = "warn", alias = "warning")]
    Warn,
    #[value(name = "info")]
    Info,
    #[value(name = "debug")]
    Debug,
    #[value(name = "trace")]
    Trace,
}

impl Cli {
    /// Validate argument combinations clap cannot express
    pub fn validate(&self) -> Result<(), String> {
        if self.verbose && self.quiet {
            return Err("Cannot use --verbose and --quiet together".to_string());
        }

        if let Some(Commands::Send { transport, options, .. }) = &self.command {
            if transport.trim().is_empty() {
                return Err("--transport cannot be empty".to_string());
            }

            let mut seen = std::collections::HashSet::new();
            if let Some((key, _)) = options.iter().find(|(key, _)| !seen.insert(key.as_str())) {
                return Err(format!("Option '{}' given more than once", key));
            }
        }

        Ok(())
    }
}

impl From<LogLevel> for String {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => "error".to_string(),
            LogLevel::Warn => "warn".to_string(),
            LogLevel::Info => "info".to_string(),
            LogLevel::Debug => "debug".to_string(),
            LogLevel::Trace => "trace".to_string(),
        }
    }
}

impl From<Environment> for crate::config::Environment {
    fn from(env: Environment) -> Self {
        match env {
            Environment::Development => crate::config::Environment::Development,
            Environment::Staging => crate::config::Environment::Staging,
            Environment::Production => crate::config::Environment::Production,
            Environment::Test => crate::config::Environment::Test,
        }
    }
}
