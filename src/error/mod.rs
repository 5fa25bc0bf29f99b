mod notify_error;

pub use notify_error::{DeliveryError, NotifyError, NotifyResult};
