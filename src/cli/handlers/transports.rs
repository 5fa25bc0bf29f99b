//! Transports command handler
//!
//! Lists the registry in its stable order.

use crate::services::notifications::{TransportDefinition, TransportRegistry};
use crate::state::AppState;

/// One row of the transport listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransportRow {
    pub id: &'static str,
    pub title: &'static str,
    pub view_modes: String,
    pub available: bool,
    pub is_default: bool,
}

/// Handler for the transports command
pub struct TransportsCommandHandler {
    state: AppState,
}

impl TransportsCommandHandler {
    pub fn new(state: AppState) -> Self {
        Self { state }
    }

    pub fn execute(&self) -> Vec<TransportRow> {
        let rows = self.rows();

        println!("{:<12} {:<22} {:<28} STATUS", "ID", "TITLE", "VIEW MODES");
        for row in &rows {
            let status = match (row.available, row.is_default) {
                (true, true) => "available (default)",
                (true, false) => "available",
                (false, true) => "not configured (default)",
                (false, false) => "not configured",
            };
            println!("{:<12} {:<22} {:<28} {}", row.id, row.title, row.view_modes, status);
        }

        rows
    }

    pub fn rows(&self) -> Vec<TransportRow> {
        let registry = self.state.notifier.registry();
        let default_transport = self.state.notifier.default_transport();

        registry
            .definitions()
            .map(|definition| Self::row(registry, definition, default_transport))
            .collect()
    }

    fn row(
        registry: &TransportRegistry,
        definition: &'static TransportDefinition,
        default_transport: &str,
    ) -> TransportRow {
        TransportRow {
            id: definition.id,
            title: definition.title,
            view_modes: definition.view_modes.join(", "),
            available: registry.has_definition(definition.id, true),
            is_default: definition.id == default_transport,
        }
    }
}
