use futures::future::join_all;
use kanban_core::ApiResult;
use kanban_domain::{Board, Column, ColumnId, ColumnPatch, NewTask, Task, TaskId, TaskPatch};
use kanban_remote::{mapper, ContentApi, ContentFormat};
use std::collections::HashSet;
use std::sync::Arc;

use crate::persist::{save_if_some, StatePersister};

/// The nested board: every column with its tasks.
pub struct BoardStore {
    api: Arc<dyn ContentApi>,
    board: Board,
    persister: Option<StatePersister>,
}

impl BoardStore {
    pub fn new(api: Arc<dyn ContentApi>) -> Self {
        Self {
            api,
            board: Board::default(),
            persister: None,
        }
    }

    pub fn with_persister(mut self, persister: StatePersister) -> Self {
        self.persister = Some(persister);
        self
    }

    pub async fn restore(&mut self) {
        if let Some(persister) = &self.persister {
            self.board = persister.restore().await;
        }
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    async fn persist(&self) {
        save_if_some(&self.persister, &self.board).await;
    }

    /// Rebuild the board from scratch.
    ///
    /// Columns are listed first; a failure there leaves the current board
    /// untouched. Tasks are then fetched for every column at once, and a
    /// column whose fetch fails is kept with no tasks of its own. A task
    /// whose primary column failed stays in the column that listed it.
    pub async fn load(&mut self) -> ApiResult<&Board> {
        let categories = self.api.list_categories().await?;
        let columns: Vec<Column> = categories
            .into_iter()
            .map(mapper::column_from_remote)
            .collect();

        let api = &self.api;
        let fetches = columns.iter().map(|column| {
            let id = column.id;
            async move { (id, api.list_posts(Some(id)).await) }
        });
        let results = join_all(fetches).await;

        let loaded: HashSet<ColumnId> = results
            .iter()
            .filter(|(_, result)| result.is_ok())
            .map(|(id, _)| *id)
            .collect();

        let mut board = Board::new(columns);
        let mut placed = HashSet::new();
        let mut failed = 0usize;

        for (column_id, result) in results {
            let posts = match result {
                Ok(posts) => posts,
                Err(e) => {
                    tracing::warn!("Tasks of column {} unavailable: {}", column_id, e);
                    failed += 1;
                    continue;
                }
            };
            for post in posts {
                let task = mapper::task_from_remote(post, ContentFormat::Plain);
                match task.category_id {
                    // Listed under a secondary category; its primary column holds it.
                    Some(primary) if primary != column_id && loaded.contains(&primary) => {}
                    // Primary column, or a column standing in for a primary
                    // whose listing failed.
                    Some(primary) if primary == column_id || board.column(primary).is_some() => {
                        if placed.insert(task.id) {
                            if let Some(column) = board.column_mut(column_id) {
                                column.tasks.push(task);
                            }
                        }
                    }
                    _ => {
                        if placed.insert(task.id) {
                            board.unassigned.push(task);
                        }
                    }
                }
            }
        }

        tracing::info!(
            "Loaded board: {} columns, {} tasks, {} column(s) degraded",
            board.columns.len(),
            board.task_count(),
            failed
        );
        self.board = board;
        self.persist().await;
        Ok(&self.board)
    }

    pub async fn add_column(&mut self, title: &str) -> ApiResult<Column> {
        let created = self
            .api
            .create_category(&mapper::category_create(title))
            .await?;
        let column = mapper::column_from_remote(created);
        self.board.columns.push(column.clone());
        self.persist().await;
        Ok(column)
    }

    pub async fn update_column(&mut self, id: ColumnId, patch: &ColumnPatch) -> ApiResult<Column> {
        let updated = self
            .api
            .update_category(id, &mapper::category_update(patch))
            .await?;
        let column = mapper::column_from_remote(updated);
        if self.board.replace_column(column.clone()) {
            self.persist().await;
        }
        Ok(column)
    }

    /// Tasks of the removed column stay on the board as unassigned.
    pub async fn delete_column(&mut self, id: ColumnId) -> ApiResult<()> {
        self.api.delete_category(id).await?;
        if self.board.remove_column(id).is_some() {
            self.persist().await;
        }
        Ok(())
    }

    pub async fn add_task(&mut self, task: &NewTask) -> ApiResult<Task> {
        let created = self.api.create_post(&mapper::post_create(task)).await?;
        let task = mapper::task_from_remote(created, ContentFormat::Plain);
        self.board.place_task(task.clone());
        self.persist().await;
        Ok(task)
    }

    pub async fn update_task(&mut self, id: TaskId, patch: &TaskPatch) -> ApiResult<Task> {
        let updated = self
            .api
            .update_post(id, &mapper::post_update(patch))
            .await?;
        let task = mapper::task_from_remote(updated, ContentFormat::Plain);
        if self.board.replace_task(task.clone()) {
            self.persist().await;
        }
        Ok(task)
    }

    pub async fn move_task(&mut self, id: TaskId, column: ColumnId) -> ApiResult<Task> {
        self.update_task(id, &TaskPatch::move_to(column)).await
    }

    pub async fn delete_task(&mut self, id: TaskId) -> ApiResult<()> {
        self.api.delete_post(id).await?;
        if self.board.remove_task(id).is_some() {
            self.persist().await;
        }
        Ok(())
    }
}
