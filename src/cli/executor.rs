//! Command executor for dispatching CLI commands
//!
//! This module provides the main entry point for executing CLI commands
//! after parsing and configuration loading.

use anyhow::anyhow;

use super::handlers::{SendCommandHandler, TransportsCommandHandler};
use super::parser::{Cli, Commands};
use crate::config::Settings;
use crate::state::AppState;

/// Execute a CLI command with the given settings
///
/// Without a subcommand the transport listing is printed.
///
/// # Errors
/// Returns CLI validation errors, notifier wiring errors and errors from
/// command handlers
pub async fn execute_command(cli: &Cli, settings: Settings) -> anyhow::Result<()> {
    cli.validate().map_err(|msg| anyhow!("Invalid arguments: {}", msg))?;

    let state = AppState::from_settings(&settings)?;

    match &cli.command {
        Some(Commands::Transports) | None => {
            TransportsCommandHandler::new(state).execute();
            Ok(())
        }
        Some(Commands::Send {
            transport,
            message,
            options,
        }) => {
            SendCommandHandler::new(state)
                .execute(transport, message, options)
                .await?;
            Ok(())
        }
    }
}
