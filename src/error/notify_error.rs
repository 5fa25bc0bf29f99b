use thiserror::Error;

use crate::services::notifications::LogLevel;

/// Error type for the dispatch pipeline.
///
/// Every variant except [`NotifyError::Delivery`] is a configuration or
/// persistence failure and is surfaced to the caller of `send`. Whatever a
/// transport's `deliver` raises, delivery failures included, is logged and
/// turned into `Ok(false)`.
#[derive(Error, Debug)]
pub enum NotifyError {
    /// No transport definition is registered under the requested identifier
    #[error("Could not send notification using the \"{name}\" transport: no such transport")]
    UnknownTransport { name: String },

    /// A required configuration value is absent or has the wrong shape
    #[error("Configuration error for {key}: {reason}")]
    Configuration { key: String, reason: String },

    /// Rendered output does not cover a view mode the transport declared
    #[error("Rendered output is missing the \"{view_mode}\" view mode")]
    MissingViewMode { view_mode: String },

    /// Rendered-fields persistence requested without a destination for a view mode
    #[error("The rendered view mode \"{view_mode}\" cannot be saved to a field, as there is no matching one")]
    MissingFieldMapping { view_mode: String },

    /// Rendered-fields destination does not exist on the message bundle
    #[error("Field \"{field}\" does not exist on bundle \"{bundle}\"")]
    UnknownField { bundle: String, field: String },

    /// The render collaborator failed for a view mode
    #[error("Failed to render view mode \"{view_mode}\"")]
    Render {
        view_mode: String,
        #[source]
        source: anyhow::Error,
    },

    /// Storage operation error with operation context
    #[error("Storage operation failed: {operation}")]
    Storage {
        operation: String,
        #[source]
        source: anyhow::Error,
    },

    /// Recoverable delivery failure
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
}

impl NotifyError {
    pub fn configuration(key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Configuration {
            key: key.into(),
            reason: reason.into(),
        }
    }

    pub fn storage(operation: impl Into<String>, source: anyhow::Error) -> Self {
        Self::Storage {
            operation: operation.into(),
            source,
        }
    }

    /// Whether the dispatcher converts this error into `delivered = false`.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, NotifyError::Delivery(_))
    }
}

/// Delivery-class failures raised by transports.
#[derive(Error, Debug)]
pub enum DeliveryError {
    #[error("No recipient for {transport}: {reason}")]
    NoRecipient {
        transport: &'static str,
        reason: String,
    },

    #[error("No verified phone number for {recipient}")]
    NoPhoneNumber { recipient: String },

    #[error("No gateway route for {number}")]
    Route { number: String },

    #[error("Failed to send {transport}. Message empty.")]
    EmptyPayload { transport: &'static str },

    /// Any other failure reported by the underlying delivery client
    #[error("{transport} delivery failed")]
    Transport {
        transport: &'static str,
        #[source]
        source: anyhow::Error,
    },
}

impl DeliveryError {
    pub fn transport(transport: &'static str, source: anyhow::Error) -> Self {
        Self::Transport { transport, source }
    }

    /// Level the failure is logged at.
    pub fn level(&self) -> LogLevel {
        match self {
            DeliveryError::EmptyPayload { .. } => LogLevel::Warn,
            _ => LogLevel::Error,
        }
    }
}

/// Type alias for Result with NotifyError to simplify function signatures
pub type NotifyResult<T> = Result<T, NotifyError>;
