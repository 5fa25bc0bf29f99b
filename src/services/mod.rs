//! Service layer.
//!
//! The notifier pipeline is the only service; it coordinates the storage,
//! render and delivery collaborators.

pub mod notifications;

pub use notifications::{MessageNotifier, TransportRegistry};
