//! Translation between WordPress entities and board entities.
//!
//! Categories become columns, posts become tasks, comments stay comments.
//! Outbound patches only carry the fields the caller actually changed.

use kanban_domain::{
    Column, ColumnPatch, Comment, CommentPatch, NewComment, NewTask, Task, TaskId, TaskPatch,
    DEFAULT_TASK_STATUS, TASK_STATUS_KEY,
};
use regex::Regex;
use std::sync::LazyLock;

use crate::wire::{
    CategoryCreate, CategoryUpdate, CommentCreate, CommentUpdate, PostCreate, PostUpdate,
    RemoteCategory, RemoteComment, RemotePost,
};

static TAG_REGEX: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"<[^>]*>").unwrap());

/// Whether task content keeps the HTML the service renders.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ContentFormat {
    #[default]
    Html,
    Plain,
}

/// Remove every markup tag. The stored remote value is untouched.
pub fn strip_markup(html: &str) -> String {
    TAG_REGEX.replace_all(html, "").into_owned()
}

pub fn column_from_remote(category: RemoteCategory) -> Column {
    Column {
        id: category.id,
        name: category.slug,
        title: category.display_name,
        description: category.description,
        post_count: category.post_count,
        tasks: Vec::new(),
    }
}

/// The service derives the slug from the display name it receives.
pub fn category_create(title: &str) -> CategoryCreate {
    CategoryCreate {
        name: title.to_string(),
        description: None,
    }
}

/// Column `title` is sent as the remote `name`, column `name` as the `slug`.
pub fn category_update(patch: &ColumnPatch) -> CategoryUpdate {
    CategoryUpdate {
        name: patch.title.clone(),
        slug: patch.name.clone(),
        description: patch.description.clone(),
    }
}

pub fn task_from_remote(post: RemotePost, format: ContentFormat) -> Task {
    let content = match format {
        ContentFormat::Html => post.content.rendered,
        ContentFormat::Plain => strip_markup(&post.content.rendered),
    };
    Task {
        id: post.id,
        title: post.title.rendered,
        content,
        excerpt: post.excerpt.rendered,
        category_id: post.category_ids.first().copied(),
        date: post.date,
        modified: post.modified,
        status: post.status,
        slug: post.slug,
        meta: post.meta,
    }
}

pub fn post_create(task: &NewTask) -> PostCreate {
    let mut meta = task.meta.clone();
    meta.entry(TASK_STATUS_KEY.to_string())
        .or_insert_with(|| DEFAULT_TASK_STATUS.to_string());
    PostCreate {
        title: task.title.clone(),
        content: task.content.clone().unwrap_or_default(),
        excerpt: task.excerpt.clone().unwrap_or_default(),
        categories: task.category_id.into_iter().collect(),
        status: task.status.unwrap_or_default(),
        meta,
    }
}

pub fn post_update(patch: &TaskPatch) -> PostUpdate {
    PostUpdate {
        title: patch.title.clone(),
        content: patch.content.clone(),
        excerpt: patch.excerpt.clone(),
        categories: patch
            .category_id
            .as_change()
            .map(|target| target.copied().into_iter().collect()),
        status: patch.status,
        meta: patch.meta.clone(),
    }
}

pub fn comment_from_remote(comment: RemoteComment) -> Comment {
    Comment {
        id: comment.id,
        task_id: comment.parent_post_id,
        author: comment.author_name,
        content: comment.content.rendered,
        date: comment.date,
        status: comment.status,
    }
}

pub fn comment_create(task_id: TaskId, comment: &NewComment) -> CommentCreate {
    CommentCreate {
        post: task_id,
        content: comment.content.clone(),
        author_name: comment.effective_author().to_string(),
        author_email: comment.effective_email().to_string(),
    }
}

pub fn comment_update(patch: &CommentPatch) -> CommentUpdate {
    CommentUpdate {
        content: patch.content.clone(),
    }
}
