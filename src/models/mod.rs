mod message;
mod rendered;

pub use message::{
    Account, AccountId, FieldDefinition, FieldKind, FieldValue, Message, MessageId,
};
pub use rendered::{RenderedContent, RenderedOutput};
