use kanban_core::ApiResult;
use kanban_domain::{ColumnId, NewTask, Task, TaskId, TaskPatch};
use kanban_remote::{mapper, ContentApi, ContentFormat};
use std::sync::Arc;

use crate::persist::{save_if_some, StatePersister};

/// Flat list of tasks, optionally scoped to one column at load time.
pub struct TaskStore {
    api: Arc<dyn ContentApi>,
    tasks: Vec<Task>,
    format: ContentFormat,
    persister: Option<StatePersister>,
}

impl TaskStore {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            api,
            tasks: Vec::new(),
            format: ContentFormat::Html,
            persister: None,
        }
    }

    pub fn with_format(mut self, format: ContentFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_persister(mut self, persister: StatePersister) -> Self {
        self.persister = Some(persister);
        self
    }

    pub async fn restore(&mut self) {
        if let Some(persister) = &self.persister {
            self.tasks = persister.restore().await;
        }
    }

    pub fn tasks(&self) -> &[Task] {
        &self.tasks
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    pub fn tasks_in(&self, column: ColumnId) -> impl Iterator<Item = &Task> {
        self.tasks.iter().filter(move |t| t.belongs_to(column))
    }

    async fn persist(&self) {
        save_if_some(&self.persister, &self.tasks).await;
    }

    /// Replace every held task with the first page of posts, optionally
    /// restricted to one column.
    pub async fn load(&mut self, column: Option<ColumnId>) -> ApiResult<&[Task]> {
        let posts = self.api.list_posts(column).await?;
        let format = self.format;
        self.tasks = posts
            .into_iter()
            .map(|post| mapper::task_from_remote(post, format))
            .collect();
        tracing::info!("Loaded {} tasks", self.tasks.len());
        self.persist().await;
        Ok(&self.tasks)
    }

    pub async fn fetch(&mut self, id: TaskId) -> ApiResult<Task> {
        let task = mapper::task_from_remote(self.api.get_post(id).await?, self.format);
        if let Some(existing) = self.tasks.iter_mut().find(|t| t.id == id) {
            *existing = task.clone();
            self.persist().await;
        }
        Ok(task)
    }

    pub async fn add(&mut self, task: &NewTask) -> ApiResult<Task> {
        let created = self.api.create_post(&mapper::post_create(task)).await?;
        let task = mapper::task_from_remote(created, self.format);
        tracing::info!("Created task {} in column {:?}", task.id, task.category_id);
        self.tasks.push(task.clone());
        self.persist().await;
        Ok(task)
    }

    pub async fn update(&mut self, id: TaskId, patch: &TaskPatch) -> ApiResult<Task> {
        let updated = self
            .api
            .update_post(id, &mapper::post_update(patch))
            .await?;
        let task = mapper::task_from_remote(updated, self.format);
        match self.tasks.iter_mut().find(|t| t.id == id) {
            Some(existing) => {
                *existing = task.clone();
                self.persist().await;
            }
            None => tracing::debug!("Updated task {} is not held locally", id),
        }
        Ok(task)
    }

    pub async fn move_task(&mut self, id: TaskId, column: ColumnId) -> ApiResult<Task> {
        self.update(id, &TaskPatch::move_to(column)).await
    }

    pub async fn delete(&mut self, id: TaskId) -> ApiResult<()> {
        self.api.delete_post(id).await?;
        self.tasks.retain(|t| t.id != id);
        tracing::info!("Deleted task {}", id);
        self.persist().await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kanban_core::{ErrorKind, NormalizedError};
    use kanban_domain::{PostStatus, TaskMeta, TASK_STATUS_KEY};
    use kanban_remote::wire::{PostCreate, RemotePost, Rendered};
    use kanban_remote::MockContentApi;

    fn post(id: i64, title: &str, categories: Vec<i64>) -> RemotePost {
        RemotePost {
            id,
            title: Rendered::from(title),
            content: Rendered::from("<p>Body</p>\n"),
            excerpt: Rendered::default(),
            category_ids: categories,
            date: None,
            modified: None,
            status: PostStatus::Publish,
            slug: String::new(),
            meta: TaskMeta::new(),
        }
    }

    fn echo_created(body: &PostCreate) -> RemotePost {
        RemotePost {
            meta: body.meta.clone(),
            ..post(100, &body.title, body.categories.clone())
        }
    }

    fn loaded_store(extra: impl FnOnce(&mut MockContentApi)) -> TaskStore {
        let mut api = MockContentApi::new();
        api.expect_list_posts().times(1).returning(|_| {
            Ok(vec![
                post(1, "first", vec![10]),
                post(2, "second", vec![10]),
                post(3, "third", vec![20]),
            ])
        });
        extra(&mut api);
        TaskStore::new(Arc::new(api))
    }

    #[tokio::test]
    async fn test_load_keeps_html_content() {
        let mut store = loaded_store(|_| {});
        let tasks = store.load(None).await.unwrap();
        assert_eq!(tasks.len(), 3);
        assert_eq!(tasks[0].content, "<p>Body</p>\n");
        assert_eq!(store.tasks_in(10).count(), 2);
    }

    #[tokio::test]
    async fn test_load_passes_column_filter() {
        let mut api = MockContentApi::new();
        api.expect_list_posts()
            .withf(|column| *column == Some(20))
            .returning(|_| Ok(vec![post(3, "third", vec![20])]));

        let mut store = TaskStore::new(Arc::new(api));
        assert_eq!(store.load(Some(20)).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_failed_load_keeps_prior_tasks() {
        let mut store = loaded_store(|api| {
            api.expect_list_posts()
                .returning(|_| Err(NormalizedError::from_status(403, None)));
        });
        store.load(None).await.unwrap();

        let err = store.load(None).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Auth);
        assert_eq!(store.tasks().len(), 3);
    }

    #[tokio::test]
    async fn test_add_without_status_defaults_to_todo() {
        let mut api = MockContentApi::new();
        api.expect_create_post()
            .returning(|body| Ok(echo_created(body)));

        let mut store = TaskStore::new(Arc::new(api));
        let task = store.add(&NewTask::new("Fresh").in_column(10)).await.unwrap();

        assert_eq!(task.id, 100);
        assert_eq!(task.task_status(), "todo");
        assert_eq!(
            store.get(100).unwrap().meta.get(TASK_STATUS_KEY).map(String::as_str),
            Some("todo")
        );
    }

    #[tokio::test]
    async fn test_delete_preserves_order_of_others() {
        let mut store = loaded_store(|api| {
            api.expect_delete_post().withf(|id| *id == 2).returning(|_| Ok(()));
        });
        store.load(None).await.unwrap();

        store.delete(2).await.unwrap();
        let ids: Vec<_> = store.tasks().iter().map(|t| t.id).collect();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn test_move_sends_only_category() {
        let mut store = loaded_store(|api| {
            api.expect_update_post()
                .withf(|id, body| {
                    *id == 1
                        && body.categories == Some(vec![20])
                        && body.title.is_none()
                        && body.content.is_none()
                        && body.meta.is_none()
                })
                .returning(|id, _| Ok(post(id, "first", vec![20])));
        });
        store.load(None).await.unwrap();

        let moved = store.move_task(1, 20).await.unwrap();
        assert_eq!(moved.category_id, Some(20));
        assert_eq!(store.tasks()[0].category_id, Some(20));
        assert_eq!(store.tasks_in(20).count(), 2);
    }

    #[tokio::test]
    async fn test_failed_update_leaves_task_untouched() {
        let mut store = loaded_store(|api| {
            api.expect_update_post()
                .returning(|_, _| Err(NormalizedError::from_status(404, None)));
        });
        store.load(None).await.unwrap();
        let before = store.tasks().to_vec();

        let err = store
            .update(1, &TaskPatch::task_status("done"))
            .await
            .unwrap_err();
        assert!(err.is_not_found());
        assert_eq!(store.tasks(), &before[..]);
    }
}
