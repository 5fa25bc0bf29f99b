//! In-memory storage used by the CLI and by tests.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use anyhow::anyhow;
use async_trait::async_trait;

use super::Storage;
use crate::models::{Account, AccountId, FieldDefinition, Message, MessageId};
use crate::render::MessageTemplate;

#[derive(Default)]
struct StorageState {
    next_id: MessageId,
    messages: HashMap<MessageId, Message>,
    accounts: HashMap<AccountId, Account>,
    /// (bundle, field name) -> definition
    fields: HashMap<(String, String), FieldDefinition>,
    save_count: usize,
}

/// Storage holding everything in a mutex-guarded map.
#[derive(Default)]
pub struct MemoryStorage {
    state: Mutex<StorageState>,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a storage whose field schema comes from message templates.
    pub fn with_templates<'a>(templates: impl IntoIterator<Item = &'a MessageTemplate>) -> Self {
        let storage = Self::new();
        for template in templates {
            for field in &template.fields {
                storage.define_field(&template.bundle, field.clone());
            }
        }
        storage
    }

    fn lock(&self) -> anyhow::Result<MutexGuard<'_, StorageState>> {
        self.state
            .lock()
            .map_err(|e| anyhow!("storage lock poisoned: {}", e))
    }

    pub fn insert_account(&self, account: Account) {
        if let Ok(mut state) = self.lock() {
            state.accounts.insert(account.id, account);
        }
    }

    pub fn define_field(&self, bundle: &str, field: FieldDefinition) {
        if let Ok(mut state) = self.lock() {
            state
                .fields
                .insert((bundle.to_string(), field.name.clone()), field);
        }
    }

    pub fn message(&self, id: MessageId) -> Option<Message> {
        self.lock().ok()?.messages.get(&id).cloned()
    }

    /// Number of `save_message` calls served so far.
    pub fn save_count(&self) -> usize {
        self.lock().map(|state| state.save_count).unwrap_or(0)
    }
}

#[async_trait]
impl Storage for MemoryStorage {
    async fn save_message(&self, message: &mut Message) -> anyhow::Result<MessageId> {
        let mut state = self.lock()?;
        let id = match message.id {
            Some(id) => id,
            None => {
                state.next_id += 1;
                state.next_id
            }
        };
        message.id = Some(id);
        state.messages.insert(id, message.clone());
        state.save_count += 1;
        Ok(id)
    }

    async fn load_account(&self, id: AccountId) -> anyhow::Result<Option<Account>> {
        Ok(self.lock()?.accounts.get(&id).cloned())
    }

    async fn field_definition(
        &self,
        bundle: &str,
        field: &str,
    ) -> anyhow::Result<Option<FieldDefinition>> {
        Ok(self
            .lock()?
            .fields
            .get(&(bundle.to_string(), field.to_string()))
            .cloned())
    }
}
