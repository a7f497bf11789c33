//! Inspect registered capi backends and exercise board bring-up.
//!
//! `capi-inspect backends` lists every backend linked into the binary with
//! the operations it populates. `capi-inspect bring-up board.json` brings a
//! board up, reports each device and shuts it down again.

use anyhow::{Context, Result};
use capi_hal::tracing::{self, prelude::*};
use capi_hal::{Board, BoardConfig, CategoryKind, Registry};
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use ::tracing::level_filters::LevelFilter;

#[derive(Parser)]
#[command(name = "capi-inspect")]
#[command(about = "Inspect capi backends and boards", long_about = None)]
#[command(version)]
struct Cli {
    /// Log at debug level to stdout
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered backends and their populated operations
    Backends {
        /// Only show backends of this category (e.g. clock, watchdog)
        #[arg(short, long)]
        category: Option<String>,
    },
    /// Bring a board up from its JSON description, then shut it down
    BringUp {
        /// Board description
        board: PathBuf,
    },
}

fn list_backends(category: Option<&str>) -> Result<()> {
    let filter = category
        .map(CategoryKind::from_str)
        .transpose()
        .with_context(|| format!("unknown category {:?}", category.unwrap_or_default()))?;

    let mut current = None;
    for desc in Registry.backends() {
        let kind = desc.table.kind();
        if filter.is_some_and(|f| f != kind) {
            continue;
        }
        if current != Some(kind) {
            println!("{}", kind.to_string().bold());
            current = Some(kind);
        }
        println!("  {:<18} {}", desc.name.cyan(), desc.description);
        println!("  {:<18} {}", "", desc.table.supported().join(" ").dimmed());
    }
    Ok(())
}

fn bring_up(path: &Path) -> Result<()> {
    let config = BoardConfig::load_from(path)
        .with_context(|| format!("loading board from {}", path.display()))?;

    let mut board = match Board::bring_up(&config) {
        Ok(board) => board,
        Err(e) => {
            println!("{} {}: {}", "FAIL".red(), config.name, e);
            return Err(e.into());
        }
    };

    println!("{}", board.name().bold());
    for device in board.devices() {
        println!(
            "  {} {:<12} {:<13} {:<18} id={}",
            "OK".green(),
            device.name,
            device.kind.to_string(),
            device.backend,
            device.id.map_or_else(|| "-".to_string(), |id| format!("{:#x}", id)),
        );
    }

    board
        .shutdown()
        .with_context(|| format!("shutting down {}", config.name))?;
    info!(board = %config.name, "Bring-up check passed");
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing::init_stdout(LevelFilter::DEBUG);
    } else {
        tracing::init_journald_or_stdout();
    }

    match cli.command {
        Commands::Backends { category } => list_backends(category.as_deref()),
        Commands::BringUp { board } => bring_up(&board),
    }
}
