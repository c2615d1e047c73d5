use serde::{Deserialize, Serialize};

use crate::column::{Column, ColumnId};
use crate::task::{Task, TaskId};

/// The aggregate of every column currently loaded, each carrying its tasks.
///
/// Tasks whose category does not match a loaded column are kept in
/// `unassigned` instead of being dropped.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub columns: Vec<Column>,
    #[serde(default)]
    pub unassigned: Vec<Task>,
}

impl Board {
    pub fn new(columns: Vec<Column>) -> Self {
        Self {
            columns,
            unassigned: Vec::new(),
        }
    }

    pub fn column(&self, id: ColumnId) -> Option<&Column> {
        self.columns.iter().find(|c| c.id == id)
    }

    pub fn column_mut(&mut self, id: ColumnId) -> Option<&mut Column> {
        self.columns.iter_mut().find(|c| c.id == id)
    }

    pub fn task(&self, id: TaskId) -> Option<&Task> {
        self.columns
            .iter()
            .flat_map(|c| c.tasks.iter())
            .chain(self.unassigned.iter())
            .find(|t| t.id == id)
    }

    pub fn task_count(&self) -> usize {
        self.columns.iter().map(|c| c.tasks.len()).sum::<usize>() + self.unassigned.len()
    }

    /// Append a task to the column its category points at, or to
    /// `unassigned` when no such column is loaded.
    pub fn place_task(&mut self, task: Task) {
        let target = task.category_id.and_then(|id| self.column_mut(id));
        match target {
            Some(column) => column.tasks.push(task),
            None => self.unassigned.push(task),
        }
    }

    /// Replace an existing task. A task that stays in its column keeps its
    /// position; one that changed category is appended to the new column.
    /// Returns `false` when no task with that id is on the board.
    pub fn replace_task(&mut self, task: Task) -> bool {
        let location = self.columns.iter().enumerate().find_map(|(ci, c)| {
            c.tasks
                .iter()
                .position(|t| t.id == task.id)
                .map(|ti| (ci, ti))
        });
        if let Some((ci, ti)) = location {
            let column = &mut self.columns[ci];
            if task.belongs_to(column.id) {
                column.tasks[ti] = task;
            } else {
                column.tasks.remove(ti);
                self.place_task(task);
            }
            return true;
        }
        if let Some(idx) = self.unassigned.iter().position(|t| t.id == task.id) {
            self.unassigned.remove(idx);
            self.place_task(task);
            return true;
        }
        false
    }

    pub fn remove_task(&mut self, id: TaskId) -> Option<Task> {
        for column in &mut self.columns {
            if let Some(idx) = column.tasks.iter().position(|t| t.id == id) {
                return Some(column.tasks.remove(idx));
            }
        }
        self.unassigned
            .iter()
            .position(|t| t.id == id)
            .map(|idx| self.unassigned.remove(idx))
    }

    /// Refresh a column's category fields, keeping its tasks.
    pub fn replace_column(&mut self, column: Column) -> bool {
        match self.column_mut(column.id) {
            Some(existing) => {
                existing.refresh_from(column);
                true
            }
            None => false,
        }
    }

    /// Remove a column. Its tasks survive remotely, so they move to
    /// `unassigned`.
    pub fn remove_column(&mut self, id: ColumnId) -> Option<Column> {
        let idx = self.columns.iter().position(|c| c.id == id)?;
        let mut column = self.columns.remove(idx);
        self.unassigned.append(&mut column.tasks);
        Some(column)
    }
}
