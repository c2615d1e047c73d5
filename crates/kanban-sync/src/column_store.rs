use kanban_core::ApiResult;
use kanban_domain::{Column, ColumnId, ColumnPatch};
use kanban_remote::{mapper, ContentApi};
use std::sync::Arc;

use crate::persist::{save_if_some, StatePersister};

/// Columns of the board, without their tasks.
pub struct ColumnStore {
    api: Arc<dyn ContentApi>,
    columns: Vec<Column>,
    persister: Option<StatePersister>,
}

impl ColumnStore {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            api,
            columns: Vec::new(),
            persister: None,
        }
    }

    pub fn with_persister(mut self, persister: StatePersister) -> Self {
        self.persister = Some(persister);
        self
    }

    /// Replace the in-memory columns with the last saved state, if any.
    pub async fn restore(&mut self) {
        if let Some(persister) = &self.persister {
            self.columns = persister.restore().await;
        }
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn get(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    async fn persist(&self) {
        save_if_some(&self.persister, &self.columns).await;
    }

    pub async fn load(&mut self) -> ApiResult<&[Column]> {
        let categories = self.api.list_categories().await?;
        self.columns = categories
            .into_iter()
            .map(mapper::column_from_remote)
            .collect();
        tracing::info!("Loaded {} columns", self.columns.len());
        self.persist().await;
        Ok(&self.columns)
    }

    /// Fetch a single column and refresh the local copy if one is held.
    pub async fn fetch(&mut self, id: ColumnId) -> ApiResult<Column> {
        let column = mapper::column_from_remote(self.api.get_category(id).await?);
        if let Some(existing) = self.columns.iter_mut().find(|c| c.id == id) {
            existing.refresh_from(column.clone());
            self.persist().await;
        }
        Ok(column)
    }

    pub async fn add(&mut self, title: &str) -> ApiResult<Column> {
        let created = self
            .api
            .create_category(&mapper::category_create(title))
            .await?;
        let column = mapper::column_from_remote(created);
        tracing::info!("Created column {} ({})", column.id, column.name);
        self.columns.push(column.clone());
        self.persist().await;
        Ok(column)
    }

    pub async fn update(&mut self, id: ColumnId, patch: &ColumnPatch) -> ApiResult<Column> {
        let updated = self
            .api
            .update_category(id, &mapper::category_update(patch))
            .await?;
        let column = mapper::column_from_remote(updated);
        match self.columns.iter_mut().find(|c| c.id == id) {
            Some(existing) => {
                existing.refresh_from(column.clone());
                self.persist().await;
            }
            None => tracing::debug!("Updated column {} is not held locally", id),
        }
        Ok(column)
    }

    pub async fn delete(&mut self, id: ColumnId) -> ApiResult<()> {
        self.api.delete_category(id).await?;
        self.columns.retain(|c| c.id != id);
        tracing::info!("Deleted column {}", id);
        self.persist().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::persist::COLUMNS_KEY;
    use kanban_core::NormalizedError;
    use kanban_persistence::{MemoryStore, StateStore};
    use kanban_remote::wire::RemoteCategory;
    use kanban_remote::MockContentApi;

    fn category(id: i64, slug: &str, name: &str) -> RemoteCategory {
        RemoteCategory {
            id,
            slug: slug.to_string(),
            display_name: name.to_string(),
            description: String::new(),
            post_count: 0,
        }
    }

    fn loaded_mock() -> MockContentApi {
        let mut api = MockContentApi::new();
        api.expect_list_categories()
            .times(1)
            .returning(|| Ok(vec![category(1, "todo", "To do"), category(2, "done", "Done")]));
        api
    }

    #[tokio::test]
    async fn test_load_replaces_columns() {
        let mut store = ColumnStore::new(Arc::new(loaded_mock()));
        let columns = store.load().await.unwrap();
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].name, "todo");
        assert_eq!(columns[1].title, "Done");
    }

    #[tokio::test]
    async fn test_failed_load_keeps_previous_columns() {
        let mut api = loaded_mock();
        api.expect_list_categories()
            .returning(|| Err(NormalizedError::from_status(500, None)));

        let mut store = ColumnStore::new(Arc::new(api));
        store.load().await.unwrap();
        let before = store.columns().to_vec();

        let err = store.load().await.unwrap_err();
        assert_eq!(err.status, Some(500));
        assert_eq!(store.columns(), &before[..]);
    }

    #[tokio::test]
    async fn test_add_appends_after_server_assigns_id() {
        let mut api = MockContentApi::new();
        api.expect_create_category()
            .withf(|body| body.name == "Blocked work")
            .returning(|_| Ok(category(9, "blocked-work", "Blocked work")));

        let mut store = ColumnStore::new(Arc::new(api));
        let column = store.add("Blocked work").await.unwrap();
        assert_eq!(column.id, 9);
        assert_eq!(column.name, "blocked-work");
        assert_eq!(column.title, "Blocked work");
        assert_eq!(store.columns().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_add_leaves_nothing_behind() {
        let mut api = MockContentApi::new();
        api.expect_create_category()
            .returning(|_| Err(NormalizedError::from_status(400, None)));

        let mut store = ColumnStore::new(Arc::new(api));
        assert!(store.add("Dup").await.is_err());
        assert!(store.columns().is_empty());
    }

    #[tokio::test]
    async fn test_update_unknown_id_is_noop() {
        let mut api = loaded_mock();
        api.expect_update_category()
            .returning(|id, _| Ok(category(id, "ghost", "Ghost")));

        let mut store = ColumnStore::new(Arc::new(api));
        store.load().await.unwrap();
        let before = store.columns().to_vec();

        let updated = store
            .update(
                77,
                &ColumnPatch {
                    title: Some("Ghost".to_string()),
                    ..ColumnPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, 77);
        assert_eq!(store.columns(), &before[..]);
    }

    #[tokio::test]
    async fn test_update_refreshes_in_place() {
        let mut api = loaded_mock();
        api.expect_update_category()
            .withf(|id, body| *id == 2 && body.name.as_deref() == Some("Finished"))
            .returning(|id, _| Ok(category(id, "done", "Finished")));

        let mut store = ColumnStore::new(Arc::new(api));
        store.load().await.unwrap();
        store
            .update(
                2,
                &ColumnPatch {
                    title: Some("Finished".to_string()),
                    ..ColumnPatch::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(store.get(2).unwrap().title, "Finished");
        assert_eq!(store.columns()[1].id, 2);
    }

    #[tokio::test]
    async fn test_delete_only_after_confirmation() {
        let mut api = loaded_mock();
        let mut seq = mockall::Sequence::new();
        api.expect_delete_category()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(NormalizedError::unreachable()));
        api.expect_delete_category()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok(()));

        let mut store = ColumnStore::new(Arc::new(api));
        store.load().await.unwrap();

        assert!(store.delete(1).await.unwrap_err().is_network());
        assert_eq!(store.columns().len(), 2);

        store.delete(1).await.unwrap();
        assert_eq!(store.columns().len(), 1);
        assert_eq!(store.columns()[0].id, 2);
    }

    #[tokio::test]
    async fn test_mutations_are_persisted_and_restored() {
        let state = Arc::new(MemoryStore::new());
        let mut store = ColumnStore::new(Arc::new(loaded_mock()))
            .with_persister(StatePersister::new(state.clone(), COLUMNS_KEY));
        store.load().await.unwrap();
        assert!(state.read(COLUMNS_KEY).await.unwrap().is_some());

        let mut fresh = ColumnStore::new(Arc::new(MockContentApi::new()))
            .with_persister(StatePersister::new(state, COLUMNS_KEY));
        fresh.restore().await;
        assert_eq!(fresh.columns().len(), 2);
    }
}
