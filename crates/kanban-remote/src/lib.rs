//! WordPress REST adapter for the kanban board.
//!
//! [`WpClient`] speaks the `wp/v2` API and normalizes every failure into a
//! [`NormalizedError`](kanban_core::NormalizedError). The [`mapper`] module
//! translates between WordPress entities and board entities.

pub mod api;
pub mod client;
pub mod mapper;
#[cfg(any(test, feature = "fake-server"))]
pub mod testing;
pub mod wire;

pub use api::ContentApi;
#[cfg(any(test, feature = "mock"))]
pub use api::MockContentApi;
pub use client::{ConnectionStatus, WpClient, CONNECTION_OK, PAGE_SIZE, REQUEST_TIMEOUT};
pub use mapper::ContentFormat;
pub use wire::ApiInfo;
