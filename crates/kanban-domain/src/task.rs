use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::column::ColumnId;
use crate::field_update::FieldUpdate;

pub type TaskId = i64;

/// Free-form metadata carried by a task, copied verbatim from the remote post.
pub type TaskMeta = BTreeMap<String, String>;

/// Metadata key holding the workflow status of a task.
pub const TASK_STATUS_KEY: &str = "task_status";
pub const DEFAULT_TASK_STATUS: &str = "todo";

/// Publication state of the post backing a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Publish,
    Draft,
    Pending,
    Private,
    Future,
    #[serde(other)]
    Other,
}

impl PostStatus {
    pub fn parse(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "publish" | "published" => Ok(PostStatus::Publish),
            "draft" => Ok(PostStatus::Draft),
            "pending" => Ok(PostStatus::Pending),
            "private" => Ok(PostStatus::Private),
            "future" => Ok(PostStatus::Future),
            _ => Err(format!(
                "Invalid post status '{}'. Valid values: publish, draft, pending, private, future",
                s
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub excerpt: String,
    /// First category of the backing post. The remote model allows several;
    /// the board keeps only one.
    pub category_id: Option<ColumnId>,
    #[serde(default)]
    pub date: Option<NaiveDateTime>,
    #[serde(default)]
    pub modified: Option<NaiveDateTime>,
    #[serde(default)]
    pub status: PostStatus,
    #[serde(default)]
    pub slug: String,
    #[serde(default)]
    pub meta: TaskMeta,
}

impl Task {
    pub fn new(id: TaskId, title: impl Into<String>, category_id: Option<ColumnId>) -> Self {
        Self {
            id,
            title: title.into(),
            content: String::new(),
            excerpt: String::new(),
            category_id,
            date: None,
            modified: None,
            status: PostStatus::Publish,
            slug: String::new(),
            meta: TaskMeta::new(),
        }
    }

    pub fn task_status(&self) -> &str {
        self.meta
            .get(TASK_STATUS_KEY)
            .map(String::as_str)
            .unwrap_or(DEFAULT_TASK_STATUS)
    }

    pub fn belongs_to(&self, column_id: ColumnId) -> bool {
        self.category_id == Some(column_id)
    }
}

/// Input for creating a task. The remote service assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    #[serde(default)]
    pub content: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub category_id: Option<ColumnId>,
    #[serde(default)]
    pub status: Option<PostStatus>,
    #[serde(default)]
    pub meta: TaskMeta,
}

impl NewTask {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }

    pub fn in_column(mut self, column_id: ColumnId) -> Self {
        self.category_id = Some(column_id);
        self
    }

    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = Some(content.into());
        self
    }

    pub fn with_task_status(mut self, status: impl Into<String>) -> Self {
        self.meta.insert(TASK_STATUS_KEY.to_string(), status.into());
        self
    }
}

/// Partial task update. Only fields that carry a change are sent remotely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub excerpt: Option<String>,
    pub category_id: FieldUpdate<ColumnId>,
    pub status: Option<PostStatus>,
    pub meta: Option<TaskMeta>,
}

impl TaskPatch {
    pub fn move_to(column_id: ColumnId) -> Self {
        Self {
            category_id: FieldUpdate::Set(column_id),
            ..Self::default()
        }
    }

    pub fn task_status(status: impl Into<String>) -> Self {
        let mut meta = TaskMeta::new();
        meta.insert(TASK_STATUS_KEY.to_string(), status.into());
        Self {
            meta: Some(meta),
            ..Self::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.excerpt.is_none()
            && !self.category_id.is_change()
            && self.status.is_none()
            && self.meta.is_none()
    }
}
