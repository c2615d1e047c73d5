use kanban_core::KanbanResult;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

/// Whole-file writes through a temporary sibling and a rename, so readers
/// never observe a half-written snapshot.
pub struct AtomicWriter;

impl AtomicWriter {
    /// Missing parent directories are created.
    pub async fn write_atomic(path: &Path, data: &[u8]) -> KanbanResult<()> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent).await?;

        // Same directory keeps the rename on one filesystem
        let temp_file = tempfile::NamedTempFile::new_in(parent)?;
        fs::write(temp_file.path(), data).await?;
        temp_file.persist(path).map_err(|e| e.error)?;

        tracing::debug!(
            "Atomically wrote {} bytes to {}",
            data.len(),
            path.display()
        );
        Ok(())
    }

    /// `None` when the file does not exist.
    pub async fn read_if_exists(path: &Path) -> KanbanResult<Option<Vec<u8>>> {
        match fs::read(path).await {
            Ok(data) => {
                tracing::debug!("Read {} bytes from {}", data.len(), path.display());
                Ok(Some(data))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub async fn remove_if_exists(path: &Path) -> KanbanResult<()> {
        match fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_atomic_write_creates_parent_dirs() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("nested/state/columns.json");

        AtomicWriter::write_atomic(&file_path, b"[]").await.unwrap();

        let read = AtomicWriter::read_if_exists(&file_path).await.unwrap();
        assert_eq!(read.as_deref(), Some(&b"[]"[..]));
    }

    #[tokio::test]
    async fn test_atomic_write_overwrites() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("test.json");

        AtomicWriter::write_atomic(&file_path, b"First").await.unwrap();
        AtomicWriter::write_atomic(&file_path, b"Second").await.unwrap();

        let read = AtomicWriter::read_if_exists(&file_path).await.unwrap();
        assert_eq!(read.as_deref(), Some(&b"Second"[..]));
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn test_missing_file() {
        let dir = tempdir().unwrap();
        let file_path = dir.path().join("absent.json");

        assert!(AtomicWriter::read_if_exists(&file_path).await.unwrap().is_none());
        AtomicWriter::remove_if_exists(&file_path).await.unwrap();
    }
}
