use kanban_persistence::StateStore;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;

pub const COLUMNS_KEY: &str = "columns";
pub const TASKS_KEY: &str = "tasks";
pub const COMMENTS_KEY: &str = "comments";
pub const BOARD_KEY: &str = "board";

/// Saves one store's state under a fixed key.
///
/// Neither direction ever fails: unreadable state restores as empty, and a
/// failed write is only logged.
#[derive(Clone)]
pub struct StatePersister {
    store: Arc<dyn StateStore>,
    key: String,
}

impl std::fmt::Debug for StatePersister {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatePersister").field("key", &self.key).finish()
    }
}

impl StatePersister {
    pub fn new(store: Arc<dyn StateStore>, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub async fn restore<T: DeserializeOwned + Default>(&self) -> T {
        match self.store.read(&self.key).await {
            Ok(Some(value)) => match serde_json::from_value(value) {
                Ok(state) => {
                    tracing::debug!("Restored '{}' state", self.key);
                    state
                }
                Err(e) => {
                    tracing::warn!("Discarding unreadable '{}' state: {}", self.key, e);
                    T::default()
                }
            },
            Ok(None) => T::default(),
            Err(e) => {
                tracing::warn!("Failed to restore '{}' state: {}", self.key, e);
                T::default()
            }
        }
    }

    pub async fn save<T: Serialize + ?Sized>(&self, state: &T) {
        let value = match serde_json::to_value(state) {
            Ok(value) => value,
            Err(e) => {
                tracing::warn!("Failed to serialize '{}' state: {}", self.key, e);
                return;
            }
        };
        match self.store.write(&self.key, &value).await {
            Ok(()) => tracing::debug!("Persisted '{}' state", self.key),
            Err(e) => tracing::warn!("Failed to persist '{}' state: {}", self.key, e),
        }
    }
}

/// Save through an optional persister.
pub(crate) async fn save_if_some<T: Serialize + ?Sized>(persister: &Option<StatePersister>, state: &T) {
    if let Some(persister) = persister {
        persister.save(state).await;
    }
}
