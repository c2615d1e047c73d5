use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use kanban_core::notify::{LoadingOptions, Notifier};
use parking_lot::Mutex;
use std::time::Duration;

/// Terminal rendering of notifications: a spinner on stderr while a call
/// runs, then a one-line outcome. stdout is left to the JSON response.
pub struct ConsoleNotifier {
    spinner: Mutex<Option<ProgressBar>>,
    message: Mutex<String>,
    quiet: bool,
}

impl ConsoleNotifier {
    pub fn new(quiet: bool) -> Self {
        Self {
            spinner: Mutex::new(None),
            message: Mutex::new(String::new()),
            quiet,
        }
    }

    fn spinner_style() -> ProgressStyle {
        ProgressStyle::default_spinner()
            .template("{spinner} {prefix:.bold.dim} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
    }
}

impl Notifier for ConsoleNotifier {
    fn show_loading(&self, options: LoadingOptions) {
        if self.quiet {
            return;
        }
        let bar = ProgressBar::new_spinner();
        bar.set_style(Self::spinner_style());
        bar.set_prefix(options.title);
        match options.progress {
            Some(p) => bar.set_message(format!("{} ({}%)", options.message, p)),
            None => bar.set_message(options.message.clone()),
        }
        bar.enable_steady_tick(Duration::from_millis(100));

        *self.message.lock() = options.message;
        if let Some(previous) = self.spinner.lock().replace(bar) {
            previous.finish_and_clear();
        }
    }

    fn hide_loading(&self) {
        if let Some(bar) = self.spinner.lock().take() {
            bar.finish_and_clear();
        }
    }

    fn set_progress(&self, progress: u8) {
        if let Some(bar) = self.spinner.lock().as_ref() {
            bar.set_message(format!("{} ({}%)", self.message.lock(), progress.min(100)));
        }
    }

    fn notify_success(&self, message: &str, title: Option<&str>) {
        if self.quiet {
            return;
        }
        match title {
            Some(title) => eprintln!("{} {}: {}", style("✓").green(), style(title).bold(), message),
            None => eprintln!("{} {}", style("✓").green(), message),
        }
    }

    fn notify_error(&self, message: &str, title: &str) {
        if self.quiet {
            return;
        }
        eprintln!("{} {}: {}", style("✗").red(), style(title).bold(), message);
    }
}
