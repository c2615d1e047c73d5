use async_trait::async_trait;
use chrono::{DateTime, Utc};
use kanban_core::KanbanResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current on-disk envelope version.
pub const FORMAT_VERSION: u32 = 1;

/// Metadata written alongside every saved value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PersistenceMetadata {
    /// Version of the persistence format
    pub format_version: u32,
    /// ID of the process that performed the save
    pub instance_id: Uuid,
    /// When this value was saved
    pub saved_at: DateTime<Utc>,
}

impl PersistenceMetadata {
    pub fn new(instance_id: Uuid) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            instance_id,
            saved_at: Utc::now(),
        }
    }
}

/// Key-value storage for snapshots of the local mirrors.
///
/// Keys are short identifiers such as `columns` or `tasks`. A key that was
/// never written reads as `None`.
#[async_trait]
pub trait StateStore: Send + Sync {
    async fn read(&self, key: &str) -> KanbanResult<Option<serde_json::Value>>;

    async fn write(&self, key: &str, value: &serde_json::Value) -> KanbanResult<()>;

    /// Removing a missing key is not an error.
    async fn remove(&self, key: &str) -> KanbanResult<()>;
}

/// Keys may only use lowercase ASCII letters, digits, `-` and `_`.
pub fn validate_key(key: &str) -> KanbanResult<()> {
    let valid = !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-' || c == '_');
    if valid {
        Ok(())
    } else {
        Err(kanban_core::KanbanError::Persistence {
            key: key.to_string(),
            message: "invalid state key".to_string(),
        })
    }
}
