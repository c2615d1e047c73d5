pub mod board;
pub mod column;
pub mod comment;
pub mod field_update;
pub mod slug;
pub mod task;
pub mod template;

pub use board::Board;
pub use column::{Column, ColumnId, ColumnPatch};
pub use comment::{Comment, CommentId, CommentPatch, NewComment};
pub use field_update::FieldUpdate;
pub use slug::slugify;
pub use task::{
    NewTask, PostStatus, Task, TaskId, TaskMeta, TaskPatch, DEFAULT_TASK_STATUS, TASK_STATUS_KEY,
};
