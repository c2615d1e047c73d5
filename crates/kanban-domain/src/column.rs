use serde::{Deserialize, Serialize};

use crate::task::Task;

pub type ColumnId = i64;

/// A board column, projected from a remote category.
///
/// `name` is the category slug (the stable machine key), `title` its display
/// name. `tasks` keeps the order in which the remote service returned them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub id: ColumnId,
    pub name: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub post_count: u32,
    #[serde(default)]
    pub tasks: Vec<Task>,
}

impl Column {
    pub fn new(id: ColumnId, name: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            title: title.into(),
            description: String::new(),
            post_count: 0,
            tasks: Vec::new(),
        }
    }

    /// Replace the category fields with a fresh copy while keeping the tasks
    /// already attached to this column.
    pub fn refresh_from(&mut self, other: Column) {
        let tasks = std::mem::take(&mut self.tasks);
        *self = Column { tasks, ..other };
    }
}

/// Partial column update; `None` fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ColumnPatch {
    pub name: Option<String>,
    pub title: Option<String>,
    pub description: Option<String>,
}

impl ColumnPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.title.is_none() && self.description.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_refresh_keeps_tasks() {
        let mut column = Column::new(1, "todo", "To do");
        column.tasks.push(Task::new(10, "First", Some(1)));

        let mut renamed = Column::new(1, "backlog", "Backlog");
        renamed.description = "Everything not started".to_string();
        column.refresh_from(renamed);

        assert_eq!(column.name, "backlog");
        assert_eq!(column.title, "Backlog");
        assert_eq!(column.description, "Everything not started");
        assert_eq!(column.tasks.len(), 1);
        assert_eq!(column.tasks[0].id, 10);
    }

    #[test]
    fn test_deserialize_without_tasks() {
        let column: Column =
            serde_json::from_str(r#"{"id": 4, "name": "done", "title": "Done"}"#).unwrap();
        assert!(column.tasks.is_empty());
        assert_eq!(column.post_count, 0);
    }
}
