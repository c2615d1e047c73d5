pub mod board;
pub mod column;
pub mod comment;
pub mod site;
pub mod task;

use kanban_core::notify::report;
use kanban_core::{with_progress, ApiResult, LoadingOptions, Notifier};
use std::future::Future;
use std::time::Duration;

/// Run one store action behind the progress indicator, then report its
/// outcome through the notifier.
pub async fn track<F, T>(
    notifier: &dyn Notifier,
    min_display: Duration,
    loading: &str,
    success: &str,
    action: F,
) -> ApiResult<T>
where
    F: Future<Output = ApiResult<T>>,
{
    let result = with_progress(
        notifier,
        LoadingOptions::with_message(loading),
        min_display,
        action,
    )
    .await;
    report(notifier, &result, success);
    result
}
