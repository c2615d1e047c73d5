//! Domain stores: in-memory mirrors of the remote board.
//!
//! Each store issues one adapter call per action and only touches its own
//! state once that call succeeds. Failures come back unchanged as
//! [`NormalizedError`](kanban_core::NormalizedError).

pub mod board_store;
pub mod column_store;
pub mod comment_store;
pub mod persist;
pub mod task_store;

pub use board_store::BoardStore;
pub use column_store::ColumnStore;
pub use comment_store::CommentStore;
pub use persist::{StatePersister, BOARD_KEY, COLUMNS_KEY, COMMENTS_KEY, TASKS_KEY};
pub use task_store::TaskStore;
