pub mod api_error;
pub mod config;
pub mod error;
pub mod notify;
pub mod result;

pub use api_error::{ErrorKind, NormalizedError, Presentation};
pub use config::{AppConfig, RemoteConfig};
pub use error::KanbanError;
pub use notify::{with_progress, LoadingOptions, Notifier, NoopNotifier};
pub use result::{ApiResult, KanbanResult};
