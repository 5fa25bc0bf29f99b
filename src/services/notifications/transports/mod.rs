//! Transport implementations, one per [`TransportKind`](super::TransportKind).

mod email;
mod sms;
mod test;
mod webhook;

pub use email::{EmailOptions, EmailTransport};
pub use sms::{SmsNumberTransport, SmsOptions, SmsTransport};
pub use test::TestTransport;
pub use webhook::{WebhookOptions, WebhookTransport};
