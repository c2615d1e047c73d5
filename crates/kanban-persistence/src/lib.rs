//! Local snapshots of the board mirrors, so a restart can show the last
//! known state before the remote answers.

pub mod store;
pub mod traits;

pub use store::*;
pub use traits::*;
