use crate::cli::Cli;
use crate::notifier::ConsoleNotifier;
use kanban_core::notify::DEFAULT_MIN_DISPLAY;
use kanban_core::{AppConfig, KanbanResult, Notifier};
use kanban_persistence::{JsonDirStore, MemoryStore, StateStore};
use kanban_remote::{ContentApi, WpClient};
use kanban_sync::{
    BoardStore, ColumnStore, CommentStore, StatePersister, TaskStore, BOARD_KEY, COLUMNS_KEY,
    COMMENTS_KEY, TASKS_KEY,
};
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs: the adapter, the stores built on it, and
/// the notifier that reports on them.
pub struct CliContext {
    pub client: Arc<WpClient>,
    pub columns: ColumnStore,
    pub tasks: TaskStore,
    pub comments: CommentStore,
    pub board: BoardStore,
    pub notifier: Box<dyn Notifier>,
    pub min_display: Duration,
}

impl CliContext {
    pub async fn load(cli: &Cli) -> KanbanResult<Self> {
        let config = AppConfig::load();
        let remote = config.remote(cli.url.clone(), cli.username.clone(), cli.password.clone());
        let client = Arc::new(WpClient::new(&remote)?);
        let api: Arc<dyn ContentApi> = client.clone();

        let state = Self::state_store(&config, cli);
        let persister = |key: &str| StatePersister::new(state.clone(), key);

        let mut columns = ColumnStore::new(api.clone()).with_persister(persister(COLUMNS_KEY));
        let mut tasks = TaskStore::new(api.clone()).with_persister(persister(TASKS_KEY));
        let mut comments = CommentStore::new(api.clone()).with_persister(persister(COMMENTS_KEY));
        let mut board = BoardStore::new(api).with_persister(persister(BOARD_KEY));

        columns.restore().await;
        tasks.restore().await;
        comments.restore().await;
        board.restore().await;

        Ok(Self {
            client,
            columns,
            tasks,
            comments,
            board,
            notifier: Box::new(ConsoleNotifier::new(cli.quiet)),
            min_display: if cli.quiet {
                Duration::ZERO
            } else {
                DEFAULT_MIN_DISPLAY
            },
        })
    }

    fn state_store(config: &AppConfig, cli: &Cli) -> Arc<dyn StateStore> {
        if cli.no_cache {
            return Arc::new(MemoryStore::new());
        }
        match config.effective_state_dir(cli.state_dir.clone()) {
            Some(dir) => {
                tracing::debug!("Caching board state in {}", dir.display());
                Arc::new(JsonDirStore::new(dir))
            }
            None => {
                tracing::warn!("No data directory available; board state is not cached");
                Arc::new(MemoryStore::new())
            }
        }
    }
}
