//! This is a command-line tool to seed and inspect a task database via [libtask]
use crate::{cli::*, config::*};
use anyhow::{Context, Result};
use clap::Parser;
use libtask::{Database, core::database::with_database};
use tracing::debug;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod output;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
    let args = Cli::parse();
    match args.command {
        Commands::Config { command } => {
            return commands::config::handle_command(command, args.database, &config_file()?).await;
        }
        Commands::Schema { output } => return commands::schema::handle_command(output),
        _ => (),
    };

    // the config file is only consulted when no database was requested
    let url = match args.database {
        Some(url) => url,
        None => resolve_database(None, config_file()?).await,
    };
    debug!(%url, "opening database");
    let db = Database::open(&url)
        .await
        .with_context(|| format!("Failed to open database '{url}'"))?;

    with_database(db, move |db| async move {
        match args.command {
            // already handled above
            Commands::Config { .. } | Commands::Schema { .. } => Ok(()),
            Commands::Seed {
                tasks,
                users,
                partition,
                seed,
            } => commands::seed::handle_command(tasks, users, partition, seed, &db).await,
            Commands::Query { command } => commands::query::handle_command(command, &db).await,
        }
    })
    .await
}
