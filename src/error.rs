//! Error types for the livesheet command driver

use livesheet_core::SheetError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse {}: {source}", path.display())]
    Config {
        path: PathBuf,
        source: toml::de::Error,
    },

    #[error("config file not found: {}", .0.display())]
    MissingConfig(PathBuf),

    #[error(transparent)]
    Sheet(#[from] SheetError),

    #[error("unknown command `{0}` (try `help`)")]
    UnknownCommand(String),

    #[error("usage: {0}")]
    Usage(&'static str),

    #[error("not a cell id: `{0}`")]
    InvalidCellId(String),
}

pub type Result<T> = std::result::Result<T, CliError>;
