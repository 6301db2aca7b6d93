use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use deckbox_sync_core::ListKind;

mod config;
mod orchestrator;

use crate::config::ConfigManager;
use crate::orchestrator::SyncOrchestrator;

#[derive(Parser)]
#[command(name = "deckbox-sync")]
#[command(author, version, about = "Deckbox tradelist/wishlist cache synchronization", long_about = None)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Cache a list if it is missing or stale
    Ensure {
        /// Remote list id
        list_id: String,

        /// Owner account name
        owner: String,

        /// Kind of list
        #[arg(short, long, default_value = "tradelist")]
        kind: ListKindArg,
    },

    /// Report whether a cached list is still fresh
    Fresh {
        /// Remote list id
        list_id: String,

        /// Kind of list
        #[arg(short, long, default_value = "tradelist")]
        kind: ListKindArg,
    },

    /// Force-refresh every cached list of a kind
    Recache {
        /// Kind of list
        #[arg(short, long, default_value = "tradelist")]
        kind: ListKindArg,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand)]
enum ConfigCommand {
    /// Show the configuration file path
    Path,

    /// List all configuration values
    List,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum ListKindArg {
    Tradelist,
    Wishlist,
}

impl From<ListKindArg> for ListKind {
    fn from(arg: ListKindArg) -> Self {
        match arg {
            ListKindArg::Tradelist => ListKind::Tradelist,
            ListKindArg::Wishlist => ListKind::Wishlist,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.debug {
        env_logger::Builder::from_env(env_logger::Env::default())
            .filter_level(log::LevelFilter::Debug)
            .filter_module("deckbox_sync_core", log::LevelFilter::Debug)
            .filter_module("deckbox_cli", log::LevelFilter::Debug)
            .format_timestamp_millis()
            .init();
        eprintln!("Debug logging enabled");
    } else {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    }

    match cli.command {
        Commands::Ensure {
            list_id,
            owner,
            kind,
        } => {
            let orchestrator = connect().await?;
            orchestrator.ensure(&list_id, &owner, kind.into()).await?;
        }
        Commands::Fresh { list_id, kind } => {
            let orchestrator = connect().await?;
            orchestrator.fresh(&list_id, kind.into()).await?;
        }
        Commands::Recache { kind } => {
            let orchestrator = connect().await?;
            orchestrator.recache(kind.into()).await?;
        }
        Commands::Config { command } => {
            config_command(command)?;
        }
    }

    Ok(())
}

async fn connect() -> Result<SyncOrchestrator> {
    let config = ConfigManager::new()
        .load()
        .context("failed to load configuration")?;
    SyncOrchestrator::new(&config).await
}

fn config_command(command: ConfigCommand) -> Result<()> {
    let manager = ConfigManager::new();

    match command {
        ConfigCommand::Path => {
            println!("{}", manager.get_config_path().display());
        }
        ConfigCommand::List => {
            let items = manager.list()?;
            eprintln!("{}", "Configuration:".bold().blue());
            eprintln!("Config file: {}", manager.get_config_path().display());
            eprintln!();
            for (key, value) in items {
                // Never echo the stored password.
                if key.ends_with(".password") && !value.is_empty() {
                    println!("{} = {}", key.cyan(), "********");
                } else {
                    println!("{} = {}", key.cyan(), value);
                }
            }
        }
    }

    Ok(())
}
