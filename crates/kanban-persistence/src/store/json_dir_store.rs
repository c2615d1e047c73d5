use crate::store::atomic_writer::AtomicWriter;
use crate::traits::{validate_key, PersistenceMetadata, StateStore, FORMAT_VERSION};
use kanban_core::{KanbanError, KanbanResult};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// One JSON file per key, `<dir>/<key>.json`.
#[derive(Debug, Clone)]
pub struct JsonDirStore {
    dir: PathBuf,
    instance_id: Uuid,
}

/// On-disk wrapper around each stored value
#[derive(Debug, Serialize, Deserialize)]
pub struct JsonEnvelope {
    pub version: u32,
    pub metadata: PersistenceMetadata,
    pub data: serde_json::Value,
}

impl JsonDirStore {
    pub fn new(dir: impl AsRef<Path>) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
            instance_id: Uuid::new_v4(),
        }
    }

    pub fn instance_id(&self) -> Uuid {
        self.instance_id
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, key: &str) -> KanbanResult<PathBuf> {
        validate_key(key)?;
        Ok(self.dir.join(format!("{}.json", key)))
    }
}

#[async_trait::async_trait]
impl StateStore for JsonDirStore {
    async fn read(&self, key: &str) -> KanbanResult<Option<serde_json::Value>> {
        let path = self.path_for(key)?;
        let Some(bytes) = AtomicWriter::read_if_exists(&path).await? else {
            return Ok(None);
        };

        let envelope: JsonEnvelope =
            serde_json::from_slice(&bytes).map_err(|e| KanbanError::Persistence {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        if envelope.version != FORMAT_VERSION {
            return Err(KanbanError::Persistence {
                key: key.to_string(),
                message: format!("Unsupported format version: {}", envelope.version),
            });
        }

        Ok(Some(envelope.data))
    }

    async fn write(&self, key: &str, value: &serde_json::Value) -> KanbanResult<()> {
        let path = self.path_for(key)?;
        let envelope = JsonEnvelope {
            version: FORMAT_VERSION,
            metadata: PersistenceMetadata::new(self.instance_id),
            data: value.clone(),
        };
        let bytes = serde_json::to_vec_pretty(&envelope)?;
        AtomicWriter::write_atomic(&path, &bytes).await?;

        tracing::debug!("Saved '{}' ({} bytes) to {}", key, bytes.len(), path.display());
        Ok(())
    }

    async fn remove(&self, key: &str) -> KanbanResult<()> {
        let path = self.path_for(key)?;
        AtomicWriter::remove_if_exists(&path).await
    }
}
