//! `statebox` command-line entry point.
//!
//! # Responsibility
//! - Drive the cart and to-do services against a SQLite snapshot file.
//! - Print resulting state as JSON for scripting.

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use rusqlite::Connection;
use statebox_core::db::open_db;
use statebox_core::{
    CartService, CorruptSnapshotPolicy, LoadOutcome, SnapshotStorage, SqliteStorage,
    StoreConfig, TodoService,
};
use std::path::Path;

mod cli;

use cli::{CartAction, Cli, Commands, TodoAction};

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli
            .log_level
            .as_deref()
            .unwrap_or_else(|| statebox_core::default_log_level());
        statebox_core::init_logging(level, log_dir)
            .map_err(anyhow::Error::msg)
            .context("failed to initialize logging")?;
    }

    run(cli)
}

fn run(cli: Cli) -> Result<()> {
    let Cli {
        command,
        data,
        strict,
        ..
    } = cli;

    match command {
        Commands::Version => {
            println!("statebox_core {}", statebox_core::core_version());
            Ok(())
        }
        Commands::Cart { action } => {
            let conn = open_data(&data, strict)?;
            let storage = SqliteStorage::try_new(&conn)?;
            let cart = CartService::open_with_config(storage, store_config(strict))?;
            run_cart(cart, action)
        }
        Commands::Todo { action } => {
            let conn = open_data(&data, strict)?;
            let storage = SqliteStorage::try_new(&conn)?;
            let todos = TodoService::open_with_config(storage, store_config(strict))?;
            run_todo(todos, action)
        }
    }
}

fn open_data(data: &Path, strict: bool) -> Result<Connection> {
    info!(
        "event=cli_start module=cli status=ok data={} strict={strict}",
        data.display()
    );
    open_db(data).with_context(|| format!("failed to open {}", data.display()))
}

fn store_config(strict: bool) -> StoreConfig {
    let policy = if strict {
        CorruptSnapshotPolicy::Reject
    } else {
        CorruptSnapshotPolicy::Reset
    };
    StoreConfig::default().with_corrupt_policy(policy)
}

fn run_cart<S: SnapshotStorage>(mut cart: CartService<S>, action: CartAction) -> Result<()> {
    warn_if_recovered(cart.load_outcome());
    match action {
        CartAction::Add { item } => {
            let quantity = cart.add(&item)?;
            println!("{item}: {quantity}");
        }
        CartAction::Decrement { item } => {
            let quantity = cart.decrement(&item)?;
            println!("{item}: {quantity}");
        }
        CartAction::Remove { item } => {
            let removed = cart.remove(&item)?;
            println!("removed {item} (was {removed})");
        }
        CartAction::Clear => cart.clear()?,
        CartAction::List => {
            println!("{}", serde_json::to_string_pretty(&cart.get_all())?);
        }
    }
    Ok(())
}

fn run_todo<S: SnapshotStorage>(mut todos: TodoService<S>, action: TodoAction) -> Result<()> {
    warn_if_recovered(todos.load_outcome());
    match action {
        TodoAction::Add { text } => {
            let id = todos.add(&text)?;
            println!("{id}");
        }
        TodoAction::Toggle { index } => {
            let completed = todos.toggle_at(index)?;
            println!("{index}: completed={completed}");
        }
        TodoAction::Remove { index } => {
            let id = todos
                .get_all()
                .as_slice()
                .get(index)
                .map(|task| task.id)
                .with_context(|| format!("no task at position {index}"))?;
            todos.remove(id)?;
            println!("removed {id}");
        }
        TodoAction::ClearCompleted => {
            let removed = todos.clear_completed()?;
            println!("removed {removed} completed tasks");
        }
        TodoAction::List => {
            println!("{}", serde_json::to_string_pretty(&todos.get_all())?);
        }
    }
    Ok(())
}

fn warn_if_recovered(outcome: &LoadOutcome) {
    if let LoadOutcome::Recovered { reason } = outcome {
        eprintln!("warning: stored snapshot was corrupt and has been reset ({reason})");
    }
}

#[cfg(test)]
mod tests {
    use super::run;
    use crate::cli::Cli;
    use clap::Parser;

    #[test]
    fn version_does_not_open_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("statebox.sqlite3");
        let cli = Cli::try_parse_from(["statebox", "--data", data.to_str().unwrap(), "version"])
            .unwrap();

        run(cli).unwrap();
        assert!(!data.exists());
    }

    #[test]
    fn cart_add_persists_to_data_file() {
        let dir = tempfile::tempdir().unwrap();
        let data = dir.path().join("statebox.sqlite3");
        let data_arg = data.to_str().unwrap();

        for _ in 0..2 {
            let cli = Cli::try_parse_from(["statebox", "--data", data_arg, "cart", "add", "book-1"])
                .unwrap();
            run(cli).unwrap();
        }

        let conn = statebox_core::db::open_db(&data).unwrap();
        let storage = statebox_core::SqliteStorage::try_new(&conn).unwrap();
        let cart = statebox_core::CartService::open(storage).unwrap();
        assert_eq!(cart.quantity("book-1"), 2);
    }
}
