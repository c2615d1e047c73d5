use crate::traits::{validate_key, StateStore};
use kanban_core::KanbanResult;
use parking_lot::Mutex;
use std::collections::HashMap;

/// Process-local store, used when on-disk caching is disabled.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, serde_json::Value>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().is_empty()
    }
}

#[async_trait::async_trait]
impl StateStore for MemoryStore {
    async fn read(&self, key: &str) -> KanbanResult<Option<serde_json::Value>> {
        validate_key(key)?;
        Ok(self.entries.lock().get(key).cloned())
    }

    async fn write(&self, key: &str, value: &serde_json::Value) -> KanbanResult<()> {
        validate_key(key)?;
        self.entries.lock().insert(key.to_string(), value.clone());
        Ok(())
    }

    async fn remove(&self, key: &str) -> KanbanResult<()> {
        validate_key(key)?;
        self.entries.lock().remove(key);
        Ok(())
    }
}
