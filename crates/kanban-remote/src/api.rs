use async_trait::async_trait;
use kanban_core::ApiResult;

use crate::wire::{
    CategoryCreate, CategoryUpdate, CommentCreate, CommentUpdate, PostCreate, PostUpdate,
    RemoteCategory, RemoteComment, RemotePost,
};

/// One operation per remote resource and verb.
///
/// Implementations never panic or return transport errors directly: every
/// failure comes back as a [`NormalizedError`](kanban_core::NormalizedError).
/// List calls return at most the first page of 100 entries.
#[cfg_attr(any(test, feature = "mock"), mockall::automock)]
#[async_trait]
pub trait ContentApi: Send + Sync {
    async fn list_categories(&self) -> ApiResult<Vec<RemoteCategory>>;
    async fn get_category(&self, id: i64) -> ApiResult<RemoteCategory>;
    async fn create_category(&self, body: &CategoryCreate) -> ApiResult<RemoteCategory>;
    async fn update_category(&self, id: i64, body: &CategoryUpdate)
        -> ApiResult<RemoteCategory>;
    async fn delete_category(&self, id: i64) -> ApiResult<()>;

    /// Posts, optionally restricted to one category.
    async fn list_posts(&self, category: Option<i64>) -> ApiResult<Vec<RemotePost>>;
    async fn get_post(&self, id: i64) -> ApiResult<RemotePost>;
    async fn create_post(&self, body: &PostCreate) -> ApiResult<RemotePost>;
    async fn update_post(&self, id: i64, body: &PostUpdate) -> ApiResult<RemotePost>;
    async fn delete_post(&self, id: i64) -> ApiResult<()>;

    async fn list_comments(&self, post: i64) -> ApiResult<Vec<RemoteComment>>;
    async fn get_comment(&self, id: i64) -> ApiResult<RemoteComment>;
    async fn create_comment(&self, body: &CommentCreate) -> ApiResult<RemoteComment>;
    async fn update_comment(&self, id: i64, body: &CommentUpdate) -> ApiResult<RemoteComment>;
    async fn delete_comment(&self, id: i64) -> ApiResult<()>;
}
