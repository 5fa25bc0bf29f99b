//! Storage collaborator for messages, accounts and field schemas.

mod memory;

pub use memory::MemoryStorage;

use async_trait::async_trait;

use crate::models::{Account, AccountId, FieldDefinition, Message, MessageId};

/// Persistence layer reached by the dispatcher and the transports.
///
/// Errors are reported as `anyhow::Error`; callers wrap them with the
/// operation that failed.
#[async_trait]
pub trait Storage: Send + Sync {
    /// Persists the message, assigning an id on first save.
    async fn save_message(&self, message: &mut Message) -> anyhow::Result<MessageId>;

    async fn load_account(&self, id: AccountId) -> anyhow::Result<Option<Account>>;

    /// Looks up a field attached to messages of `bundle`.
    async fn field_definition(
        &self,
        bundle: &str,
        field: &str,
    ) -> anyhow::Result<Option<FieldDefinition>>;
}
