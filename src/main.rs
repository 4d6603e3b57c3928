//! Livesheet - a live sheet of named formulas driven from the command line

mod config;
mod error;
mod repl;

use anyhow::Context;
use clap::Parser;
use livesheet_core::{FileStorage, Sheet};
use std::io::{self, BufReader};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "livesheet", version, about = "Live reactive sheet of named formulas")]
struct Cli {
    /// Load settings from this TOML file instead of the per-user config
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Directory holding the persisted formulas
    #[arg(short, long, value_name = "DIR")]
    storage_dir: Option<PathBuf>,

    /// Ignore the per-user config file
    #[arg(long, conflicts_with = "config")]
    no_config: bool,
}

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let file = config::load_config(cli.config.as_deref(), !cli.no_config)?;
    let settings = config::resolve(&file, cli.storage_dir);
    let storage = FileStorage::new(settings.storage_dir);
    log::info!("storage dir: {}", storage.dir().display());

    let dir = storage.dir().to_path_buf();
    let mut sheet = Sheet::bootstrap(storage, settings.sheet)
        .with_context(|| format!("failed to restore sheet from {}", dir.display()))?;

    let stdout = io::stdout();
    let mut out = stdout.lock();
    repl::run(&mut sheet, BufReader::new(io::stdin()), &mut out)?;
    Ok(())
}
