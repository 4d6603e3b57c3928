//! livesheet-core - UI-agnostic reactive sheet model + persistence.

pub mod config;
pub mod diagnostics;
pub mod error;
pub mod sheet;
pub mod storage;

pub use config::SheetConfig;
pub use diagnostics::{Diagnostic, DiagnosticKind, MAX_BUFFERED_DIAGNOSTICS};
pub use error::{Result, SheetError};
pub use sheet::{CellId, CellView, PersistedState, Scope, Sheet};
pub use storage::{FORMULAS_KEY, FileStorage, MemoryStorage, Storage};

pub use livesheet_engine::engine::Value;
