//! message-notify library
//!
//! Dispatches notification messages through pluggable transports: render
//! the message for the transport, attempt delivery once, record the outcome.

use shadow_rs::shadow;
shadow!(build);

pub mod cli;
pub mod config;
pub mod error;
pub mod external;
pub mod logger;
pub mod models;
pub mod render;
pub mod repositories;
pub mod services;
pub mod state;

pub use error::{DeliveryError, NotifyError, NotifyResult};
pub use services::notifications::{DispatchOptions, MessageNotifier, TransportKind};
pub use state::AppState;

pub fn pkg_version() -> &'static str {
    build::PKG_VERSION
}

pub fn clap_long_version() -> &'static str {
    build::CLAP_LONG_VERSION
}
