//! Error types for Livesheet core.

use thiserror::Error;

use crate::sheet::CellId;

/// Errors that can occur while running a sheet
#[derive(Error, Debug)]
pub enum SheetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Unknown cell: {0}")]
    UnknownCell(CellId),

    #[error("Invalid storage key: {0}")]
    InvalidKey(String),
}

pub type Result<T> = std::result::Result<T, SheetError>;
