use clap::{Args, Parser, Subcommand};
use kanban_domain::{ColumnId, CommentId, PostStatus, TaskId};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "kanban")]
#[command(about = "A kanban board stored in a WordPress site", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Root URL of the WordPress site
    #[arg(long, global = true, env = "KANBAN_WP_URL")]
    pub url: Option<String>,

    /// Username for HTTP Basic auth
    #[arg(long, global = true, env = "KANBAN_WP_USERNAME")]
    pub username: Option<String>,

    /// Password (or application password) for HTTP Basic auth
    #[arg(long, global = true, env = "KANBAN_WP_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// Directory for cached board state
    #[arg(long, global = true, env = "KANBAN_STATE_DIR")]
    pub state_dir: Option<PathBuf>,

    /// Keep state in memory only
    #[arg(long, global = true)]
    pub no_cache: bool,

    /// Hide progress and notification lines
    #[arg(long, short, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Check that the WordPress REST API answers
    Ping,
    /// Show the site's REST index
    Info,
    /// Board operations
    Board(BoardCommand),
    /// Column operations
    Column(ColumnCommand),
    /// Task operations
    Task(TaskCommand),
    /// Comment operations
    Comment(CommentCommand),
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

// Board commands
#[derive(Args)]
pub struct BoardCommand {
    #[command(subcommand)]
    pub action: BoardAction,
}

#[derive(Subcommand)]
pub enum BoardAction {
    /// Show every column with its tasks
    Show {
        /// Print the last saved board without contacting WordPress
        #[arg(long)]
        cached: bool,
    },
    /// Create the starter columns and sample tasks that are missing
    Seed,
}

// Column commands
#[derive(Args)]
pub struct ColumnCommand {
    #[command(subcommand)]
    pub action: ColumnAction,
}

#[derive(Subcommand)]
pub enum ColumnAction {
    /// List columns
    List,
    /// Get a specific column
    Get {
        #[arg(long)]
        id: ColumnId,
    },
    /// Create a column
    Create {
        #[arg(long)]
        title: String,
    },
    /// Update a column
    Update(ColumnUpdateArgs),
    /// Delete a column
    Delete {
        #[arg(long)]
        id: ColumnId,
    },
}

#[derive(Args)]
pub struct ColumnUpdateArgs {
    #[arg(long)]
    pub id: ColumnId,
    /// Machine key (slug)
    #[arg(long)]
    pub name: Option<String>,
    /// Display title
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub description: Option<String>,
}

// Task commands
#[derive(Args)]
pub struct TaskCommand {
    #[command(subcommand)]
    pub action: TaskAction,
}

#[derive(Subcommand)]
pub enum TaskAction {
    /// List tasks
    List {
        /// Only tasks of this column
        #[arg(long)]
        column: Option<ColumnId>,
    },
    /// Get a specific task
    Get {
        #[arg(long)]
        id: TaskId,
    },
    /// Create a task
    Create(TaskCreateArgs),
    /// Update a task
    Update(TaskUpdateArgs),
    /// Move a task to another column
    Move {
        #[arg(long)]
        id: TaskId,
        #[arg(long)]
        column: ColumnId,
    },
    /// Delete a task
    Delete {
        #[arg(long)]
        id: TaskId,
    },
}

#[derive(Args)]
pub struct TaskCreateArgs {
    #[arg(long)]
    pub title: String,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub excerpt: Option<String>,
    #[arg(long)]
    pub column: Option<ColumnId>,
    /// Workflow status stored in the task metadata (default: todo)
    #[arg(long)]
    pub status: Option<String>,
    /// Publication status of the backing post (default: publish)
    #[arg(long, value_parser = PostStatus::parse)]
    pub post_status: Option<PostStatus>,
}

#[derive(Args)]
pub struct TaskUpdateArgs {
    #[arg(long)]
    pub id: TaskId,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub content: Option<String>,
    #[arg(long)]
    pub excerpt: Option<String>,
    #[arg(long, conflicts_with = "no_column")]
    pub column: Option<ColumnId>,
    /// Remove the task from every column
    #[arg(long)]
    pub no_column: bool,
    #[arg(long)]
    pub status: Option<String>,
    #[arg(long, value_parser = PostStatus::parse)]
    pub post_status: Option<PostStatus>,
}

// Comment commands
#[derive(Args)]
pub struct CommentCommand {
    #[command(subcommand)]
    pub action: CommentAction,
}

#[derive(Subcommand)]
pub enum CommentAction {
    /// List the comments of a task
    List {
        #[arg(long)]
        task: TaskId,
    },
    /// Comment on a task
    Create {
        #[arg(long)]
        task: TaskId,
        #[arg(long)]
        content: String,
        #[arg(long)]
        author: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
    /// Edit a comment
    Update {
        #[arg(long)]
        id: CommentId,
        #[arg(long)]
        content: String,
    },
    /// Delete a comment
    Delete {
        #[arg(long)]
        id: CommentId,
    },
}
