//! Sheet state and logic (UI-agnostic).
//!
//! A [`Sheet`] owns the dynamic set of cells, the shared [`Scope`] folded
//! from their values, and the [`PersistedState`] folded from their formula
//! text. Hosts drive it with edits, removals and the passage of time.

mod cell;
mod debounce;
mod fold;
mod ops;
mod propagate;
mod scope;

pub use fold::PersistedState;
pub use scope::Scope;

use cell::{Cell, CellArena};
use livesheet_engine::engine::{FormulaEngine, Value};
use std::fmt;

use crate::config::SheetConfig;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::Result;
use crate::storage::{FORMULAS_KEY, Storage};

/// Identity of a cell within one sheet. Never reused.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq, Ord, PartialOrd)]
pub struct CellId(usize);

impl CellId {
    pub fn new(index: usize) -> CellId {
        CellId(index)
    }

    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for CellId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Renderable state of one cell.
#[derive(Clone, Debug, PartialEq)]
pub struct CellView {
    pub id: CellId,
    pub name: Option<String>,
    /// Text of the accepted formula
    pub formula: Option<String>,
    pub value: Value,
    /// Number of times the formula has been evaluated
    pub evaluations: u64,
    /// Removal requested, teardown pending
    pub removing: bool,
}

impl CellView {
    fn of(cell: &Cell) -> CellView {
        CellView {
            id: cell.id(),
            name: cell.name().map(str::to_string),
            formula: cell.formula().map(|formula| formula.text().to_string()),
            value: cell.value(),
            evaluations: cell.evaluations(),
            removing: cell.is_removing(),
        }
    }
}

/// A live sheet of named formula cells.
pub struct Sheet<S: Storage> {
    config: SheetConfig,
    engine: FormulaEngine,
    arena: CellArena,
    scope: Scope,
    persisted: PersistedState,
    /// Serialized form of the last value written to (or read from) storage
    last_written: String,
    storage: S,
    diagnostics: Diagnostics,
    /// Names changed while restoring, propagated in one wave afterwards
    deferred: Option<Vec<String>>,
}

impl<S: Storage> Sheet<S> {
    /// Read the persisted formulas once and restore one cell per entry, in
    /// stored order. Missing or blank storage starts an empty sheet.
    pub fn bootstrap(storage: S, config: SheetConfig) -> Result<Self> {
        let loaded = match storage.get(FORMULAS_KEY)? {
            Some(text) if !text.trim().is_empty() => PersistedState::from_json(&text)?,
            _ => PersistedState::new(),
        };
        let last_written = loaded.to_json()?;

        let mut sheet = Sheet {
            config,
            engine: FormulaEngine::new(),
            arena: CellArena::default(),
            scope: Scope::default(),
            persisted: loaded.clone(),
            last_written,
            storage,
            diagnostics: Diagnostics::default(),
            deferred: Some(Vec::new()),
        };

        for (name, formula) in loaded.iter() {
            sheet.restore_cell(name, formula);
        }
        if let Some(changed) = sheet.deferred.take() {
            sheet.propagate(changed);
        }
        sheet.persist();
        log::info!("restored {} cells", sheet.arena.len());

        Ok(sheet)
    }

    fn restore_cell(&mut self, name: &str, formula: &str) {
        let id = self.add_cell();
        log::debug!("restoring cell {} as `{}` = {}", id, name, formula);
        if !name.is_empty() {
            self.apply_name(id, name.to_string());
        }
        self.apply_formula(id, formula.to_string());
    }

    /// The shared scope as every cell sees it.
    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    /// The name → formula mapping mirrored to storage.
    pub fn persisted(&self) -> &PersistedState {
        &self.persisted
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    /// Current value published under `name`; undefined if absent.
    pub fn value_of(&self, name: &str) -> Value {
        self.scope.get(name).flatten()
    }

    pub fn cell(&self, id: CellId) -> Option<CellView> {
        self.arena.get(id).map(CellView::of)
    }

    /// Every live cell in collection order.
    pub fn rows(&self) -> Vec<CellView> {
        self.arena.iter().map(CellView::of).collect()
    }

    /// Drain diagnostics reported since the last call. Only the newest
    /// [`MAX_BUFFERED_DIAGNOSTICS`](crate::MAX_BUFFERED_DIAGNOSTICS) are kept
    /// between calls; every diagnostic is also logged when reported.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        self.diagnostics.take()
    }
}
