//! Notifier dispatch pipeline.
//!
//! [`MessageNotifier`] looks a transport up in the [`TransportRegistry`],
//! instantiates it with merged [`DispatchOptions`], renders every view mode
//! the transport declares, delivers, then hands the outcome to the
//! [`OutcomeRecorder`].

mod dispatcher;
mod logging;
mod recorder;
mod registry;
mod transport;

pub mod options;
pub mod transports;

#[cfg(test)]
mod fakes;

pub use dispatcher::{AccessGate, AllowAll, MessageNotifier};
pub use logging::{LogLevel, NotifyLogger, TracingLogger, interpolate};
pub use options::{CommonOptions, DispatchOptions, OptionMap};
pub use recorder::{DeliveryFailure, DeliveryOutcome, OutcomeRecorder};
pub use registry::{Collaborators, TransportEntry, TransportFactory, TransportRegistry};
pub use transport::{Transport, TransportDefinition, TransportKind};
