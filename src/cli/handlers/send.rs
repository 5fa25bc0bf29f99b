//! Send command handler
//!
//! Reads a message file, seeds its owner into storage and dispatches it.

use std::path::Path;

use anyhow::Context;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::models::{Account, Message};
use crate::services::notifications::DispatchOptions;
use crate::state::AppState;

/// Message file contents: a message plus an optional inline owner
#[derive(Debug, Deserialize)]
pub struct MessageFile {
    #[serde(flatten)]
    pub message: Message,
    #[serde(default)]
    pub owner_account: Option<Account>,
}

impl MessageFile {
    pub async fn read(path: &Path) -> anyhow::Result<Self> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read message file '{}'", path.display()))?;

        serde_json::from_str(&contents)
            .with_context(|| format!("Invalid message file '{}'", path.display()))
    }
}

/// Outcome of one send, as printed to the user
#[derive(Debug)]
pub struct SendReport {
    pub delivered: bool,
    pub message: Message,
}

/// Handler for the send command
pub struct SendCommandHandler {
    state: AppState,
}

impl SendCommandHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    /// Dispatch the message in `message_path` through `transport`
    ///
    /// # Errors
    /// - Message file errors
    /// - Configuration-class errors and failed saves from the notifier
    pub async fn execute(
        &self,
        transport: &str,
        message_path: &Path,
        options: &[(String, JsonValue)],
    ) -> anyhow::Result<SendReport> {
        let file = MessageFile::read(message_path).await?;
        let report = self.send(file, transport, options).await?;
        Self::print(transport, &report);
        Ok(report)
    }

    pub async fn send(
        &self,
        file: MessageFile,
        transport: &str,
        options: &[(String, JsonValue)],
    ) -> anyhow::Result<SendReport> {
        let mut message = file.message;
        if let Some(account) = file.owner_account {
            message.owner.get_or_insert(account.id);
            self.state.storage.insert_account(account);
        }

        let options: DispatchOptions = options.iter().cloned().collect();
        let delivered = self
            .state
            .notifier
            .send(&mut message, &options, transport)
            .await?;

        Ok(SendReport { delivered, message })
    }

    fn print(transport: &str, report: &SendReport) {
        let status = if report.delivered { "✓ Delivered" } else { "✗ Not delivered" };
        println!("{} via {}", status, transport);

        match report.message.id {
            Some(id) => println!("  Message ID: {}", id),
            None => println!("  Message not saved"),
        }

        if let Some(output) = report.message.output() {
            for (view_mode, content) in output.iter() {
                println!("  [{}] {}", view_mode, content.text);
            }
        }
    }
}
