//! Notification capability used by callers of the stores.
//!
//! The core only decides *what* to signal (loading, progress, success,
//! error with a title); rendering belongs to whichever front end implements
//! [`Notifier`].

use crate::api_error::NormalizedError;
use crate::result::ApiResult;
use std::future::Future;
use std::time::Duration;
use tokio::time::Instant;

/// Minimum time a loading indicator stays visible, so fast calls don't flicker.
pub const DEFAULT_MIN_DISPLAY: Duration = Duration::from_millis(300);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadingOptions {
    pub title: String,
    pub message: String,
    /// Percentage in `0..=100`, `None` for an indeterminate indicator
    pub progress: Option<u8>,
    pub cancellable: bool,
}

impl Default for LoadingOptions {
    fn default() -> Self {
        Self {
            title: "Chargement...".to_string(),
            message: "Veuillez patienter".to_string(),
            progress: None,
            cancellable: false,
        }
    }
}

impl LoadingOptions {
    pub fn with_message(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            ..Self::default()
        }
    }
}

pub trait Notifier: Send + Sync {
    fn show_loading(&self, options: LoadingOptions);
    fn hide_loading(&self);
    fn set_progress(&self, progress: u8);
    fn notify_success(&self, message: &str, title: Option<&str>);
    fn notify_error(&self, message: &str, title: &str);
}

/// Discards every notification.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopNotifier;

impl Notifier for NoopNotifier {
    fn show_loading(&self, _options: LoadingOptions) {}
    fn hide_loading(&self) {}
    fn set_progress(&self, _progress: u8) {}
    fn notify_success(&self, _message: &str, _title: Option<&str>) {}
    fn notify_error(&self, _message: &str, _title: &str) {}
}

pub fn report_error(notifier: &dyn Notifier, error: &NormalizedError) {
    let presentation = error.presentation();
    notifier.notify_error(&presentation.message, &presentation.title);
}

/// Signal the outcome of a user-initiated action.
pub fn report<T>(notifier: &dyn Notifier, result: &ApiResult<T>, success_message: &str) {
    match result {
        Ok(_) => notifier.notify_success(success_message, None),
        Err(e) => report_error(notifier, e),
    }
}

struct HideOnDrop<'a>(&'a dyn Notifier);

impl Drop for HideOnDrop<'_> {
    fn drop(&mut self) {
        self.0.hide_loading();
    }
}

/// Run `action` with a loading indicator that stays up for at least
/// `min_display`. The indicator is hidden even if the future is dropped early.
pub async fn with_progress<F, T>(
    notifier: &dyn Notifier,
    options: LoadingOptions,
    min_display: Duration,
    action: F,
) -> T
where
    F: Future<Output = T>,
{
    let started = Instant::now();
    notifier.show_loading(options);
    let _guard = HideOnDrop(notifier);

    let output = action.await;

    let elapsed = started.elapsed();
    if elapsed < min_display {
        tokio::time::sleep(min_display - elapsed).await;
    }
    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    #[derive(Default)]
    struct RecordingNotifier {
        events: Mutex<Vec<String>>,
    }

    impl RecordingNotifier {
        fn events(&self) -> Vec<String> {
            self.events.lock().clone()
        }
    }

    impl Notifier for RecordingNotifier {
        fn show_loading(&self, options: LoadingOptions) {
            self.events.lock().push(format!("show:{}", options.message));
        }
        fn hide_loading(&self) {
            self.events.lock().push("hide".to_string());
        }
        fn set_progress(&self, progress: u8) {
            self.events.lock().push(format!("progress:{}", progress));
        }
        fn notify_success(&self, message: &str, _title: Option<&str>) {
            self.events.lock().push(format!("success:{}", message));
        }
        fn notify_error(&self, message: &str, title: &str) {
            self.events.lock().push(format!("error:{}:{}", title, message));
        }
    }

    #[tokio::test]
    async fn test_with_progress_shows_then_hides() {
        let notifier = RecordingNotifier::default();
        let value = with_progress(
            &notifier,
            LoadingOptions::with_message("Chargement du tableau"),
            Duration::ZERO,
            async { 42 },
        )
        .await;

        assert_eq!(value, 42);
        assert_eq!(
            notifier.events(),
            vec!["show:Chargement du tableau".to_string(), "hide".to_string()]
        );
    }

    #[tokio::test]
    async fn test_with_progress_honours_minimum_display() {
        let notifier = RecordingNotifier::default();
        let started = std::time::Instant::now();
        with_progress(
            &notifier,
            LoadingOptions::default(),
            Duration::from_millis(60),
            async {},
        )
        .await;
        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    #[test]
    fn test_report_error_uses_presentation() {
        let notifier = RecordingNotifier::default();
        let result: ApiResult<()> = Err(NormalizedError::from_status(404, None));
        report(&notifier, &result, "ok");
        assert_eq!(
            notifier.events(),
            vec!["error:Ressource introuvable:L'élément demandé n'existe plus ou a été déplacé."
                .to_string()]
        );

        let ok: ApiResult<u8> = Ok(1);
        report(&notifier, &ok, "Tâche créée");
        assert_eq!(notifier.events().last().unwrap(), "success:Tâche créée");
    }
}
