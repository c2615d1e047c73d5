use kanban_core::ApiResult;
use kanban_domain::{Comment, CommentId, CommentPatch, NewComment, TaskId};
use kanban_remote::{mapper, ContentApi};
use std::sync::Arc;

use crate::persist::{save_if_some, StatePersister};

/// Comments of the task most recently loaded.
///
/// Comments created on another task are sent but not kept locally.
pub struct CommentStore {
    api: Arc<dyn ContentApi>,
    task: Option<TaskId>,
    comments: Vec<Comment>,
    persister: Option<StatePersister>,
}

impl CommentStore {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            api,
            task: None,
            comments: Vec::new(),
            persister: None,
        }
    }

    pub fn with_persister(mut self, persister: StatePersister) -> Self {
        self.persister = Some(persister);
        self
    }

    pub async fn restore(&mut self) {
        if let Some(persister) = &self.persister {
            self.comments = persister.restore().await;
            self.task = self.comments.first().map(|c| c.task_id);
        }
    }

    pub fn task(&self) -> Option<TaskId> {
        self.task
    }

    pub fn comments(&self) -> &[Comment] {
        &self.comments
    }

    pub fn get(&self, id: CommentId) -> Option<&Comment> {
        self.comments.iter().find(|c| c.id == id)
    }

    async fn persist(&self) {
        save_if_some(&self.persister, &self.comments).await;
    }

    pub async fn load(&mut self, task: TaskId) -> ApiResult<&[Comment]> {
        let remote = self.api.list_comments(task).await?;
        self.comments = remote
            .into_iter()
            .map(mapper::comment_from_remote)
            .collect();
        self.task = Some(task);
        tracing::info!("Loaded {} comments for task {}", self.comments.len(), task);
        self.persist().await;
        Ok(&self.comments)
    }

    pub async fn fetch(&mut self, id: CommentId) -> ApiResult<Comment> {
        let comment = mapper::comment_from_remote(self.api.get_comment(id).await?);
        if let Some(existing) = self.comments.iter_mut().find(|c| c.id == id) {
            *existing = comment.clone();
            self.persist().await;
        }
        Ok(comment)
    }

    pub async fn add(&mut self, task: TaskId, comment: &NewComment) -> ApiResult<Comment> {
        let created = self
            .api
            .create_comment(&mapper::comment_create(task, comment))
            .await?;
        let comment = mapper::comment_from_remote(created);
        tracing::info!("Created comment {} on task {}", comment.id, task);
        if self.task == Some(comment.task_id) {
            self.comments.push(comment.clone());
            self.persist().await;
        }
        Ok(comment)
    }

    pub async fn update(&mut self, id: CommentId, patch: &CommentPatch) -> ApiResult<Comment> {
        let updated = self
            .api
            .update_comment(id, &mapper::comment_update(patch))
            .await?;
        let comment = mapper::comment_from_remote(updated);
        if let Some(existing) = self.comments.iter_mut().find(|c| c.id == id) {
            *existing = comment.clone();
            self.persist().await;
        }
        Ok(comment)
    }

    pub async fn delete(&mut self, id: CommentId) -> ApiResult<()> {
        self.api.delete_comment(id).await?;
        self.comments.retain(|c| c.id != id);
        tracing::info!("Deleted comment {}", id);
        self.persist().await;
        Ok(())
    }
}
