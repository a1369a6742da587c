use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "statebox")]
#[command(about = "Persisted cart and to-do stores", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// SQLite file holding the persisted snapshots
    #[arg(long, env = "STATEBOX_DATA", default_value = "statebox.sqlite3")]
    pub data: PathBuf,

    /// Absolute directory for rolling log files; logging is off when unset
    #[arg(long, env = "STATEBOX_LOG_DIR")]
    pub log_dir: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "STATEBOX_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Fail instead of starting empty when a persisted snapshot is corrupt
    #[arg(long)]
    pub strict: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Shopping cart operations
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },

    /// To-do list operations
    Todo {
        #[command(subcommand)]
        action: TodoAction,
    },

    /// Print the core library version
    Version,
}

#[derive(Subcommand)]
pub enum CartAction {
    /// Add one unit of an item
    Add { item: String },

    /// Remove one unit of an item
    Decrement { item: String },

    /// Remove an item line entirely
    Remove { item: String },

    /// Empty the cart
    Clear,

    /// Print the cart as JSON
    List,
}

#[derive(Subcommand)]
pub enum TodoAction {
    /// Append a task
    Add { text: String },

    /// Flip completion of the task at a 0-based position
    Toggle { index: usize },

    /// Remove the task at a 0-based position
    Remove { index: usize },

    /// Drop every completed task
    ClearCompleted,

    /// Print the task list as JSON
    List,
}
