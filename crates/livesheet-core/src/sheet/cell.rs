//! Per-cell reactive state: name, formula, scope subscription, value.
//!
//! A cell takes raw edits, coalesces them, and turns accepted ones into
//! reducers for the sheet to fold. It reads the shared scope only through its
//! [`ScopeLens`] and never writes it.

use livesheet_engine::engine::{Formula, FormulaEngine, ScopeLens, Value};
use std::time::Instant;

use super::debounce::Debounce;
use super::fold::Reducer;
use super::scope::{Scope, same_value};
use super::CellId;
use crate::config::SheetConfig;
use crate::diagnostics::{DiagnosticKind, Diagnostics};

/// Pending timers of a cell. Declaration order breaks deadline ties.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub(crate) enum Timer {
    NameEdit,
    FormulaEdit,
    Teardown,
}

/// An accepted name change: the rename signal.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct NameChange {
    pub previous: Option<String>,
    pub current: String,
}

pub(crate) struct Cell {
    id: CellId,
    name: Option<String>,
    /// Last raw formula text seen, valid or not
    raw_formula: Option<String>,
    formula: Option<Formula>,
    lens: Option<ScopeLens>,
    value: Value,
    evaluations: u64,
    name_edit: Debounce<String>,
    formula_edit: Debounce<String>,
    teardown_at: Option<Instant>,
}

impl Cell {
    pub(crate) fn new(id: CellId, config: &SheetConfig) -> Self {
        Cell {
            id,
            name: None,
            raw_formula: None,
            formula: None,
            lens: None,
            value: None,
            evaluations: 0,
            name_edit: Debounce::new(config.name_debounce),
            formula_edit: Debounce::new(config.formula_debounce),
            teardown_at: None,
        }
    }

    pub(crate) fn id(&self) -> CellId {
        self.id
    }

    pub(crate) fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub(crate) fn formula(&self) -> Option<&Formula> {
        self.formula.as_ref()
    }

    pub(crate) fn value(&self) -> Value {
        self.value
    }

    pub(crate) fn evaluations(&self) -> u64 {
        self.evaluations
    }

    pub(crate) fn is_removing(&self) -> bool {
        self.teardown_at.is_some()
    }

    /// Names the current formula reads from the scope.
    pub(crate) fn inputs(&self) -> &[String] {
        match &self.lens {
            Some(lens) => lens.vars(),
            None => &[],
        }
    }

    pub(crate) fn edit_name(&mut self, text: String, now: Instant) {
        if !self.is_removing() {
            self.name_edit.push(text, now);
        }
    }

    pub(crate) fn edit_formula(&mut self, text: String, now: Instant) {
        if !self.is_removing() {
            self.formula_edit.push(text, now);
        }
    }

    pub(crate) fn take_name_edit(&mut self) -> Option<String> {
        self.name_edit.take()
    }

    pub(crate) fn take_formula_edit(&mut self) -> Option<String> {
        self.formula_edit.take()
    }

    /// Earliest pending timer.
    pub(crate) fn next_timer(&self) -> Option<(Instant, Timer)> {
        [
            self.name_edit.deadline().map(|at| (at, Timer::NameEdit)),
            self.formula_edit.deadline().map(|at| (at, Timer::FormulaEdit)),
            self.teardown_at.map(|at| (at, Timer::Teardown)),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// Accept a name, dropping repeats of the current one.
    pub(crate) fn accept_name(&mut self, name: String) -> Option<NameChange> {
        if self.name.as_deref() == Some(name.as_str()) {
            return None;
        }
        let previous = self.name.replace(name.clone());
        Some(NameChange {
            previous,
            current: name,
        })
    }

    /// Accept raw formula text.
    ///
    /// Repeats of the last raw text are dropped. Text that fails to compile
    /// is reported and dropped, leaving the previous formula and value in
    /// effect. A compiled formula replaces the scope subscription and is
    /// evaluated immediately. Returns true when a new formula took effect.
    pub(crate) fn accept_formula(
        &mut self,
        text: String,
        engine: &FormulaEngine,
        scope: &mut Scope,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        if self.raw_formula.as_deref() == Some(text.as_str()) {
            return false;
        }
        self.raw_formula = Some(text.clone());

        let formula = match engine.compile(&text) {
            Ok(formula) => formula,
            Err(e) => {
                diagnostics.report(self.id, DiagnosticKind::Parse(e));
                return false;
            }
        };

        if let Some(old) = self.lens.take() {
            scope.unsubscribe(self.id, old.vars());
        }
        scope.subscribe(self.id, formula.free_variables());
        self.lens = Some(ScopeLens::new(formula.free_variables()));
        self.formula = Some(formula);

        self.recompute(engine, scope, diagnostics);
        true
    }

    /// Re-read the narrowed scope and evaluate if it changed.
    /// Returns true when the value changed.
    pub(crate) fn recompute(
        &mut self,
        engine: &FormulaEngine,
        scope: &Scope,
        diagnostics: &mut Diagnostics,
    ) -> bool {
        let (Some(formula), Some(lens)) = (&self.formula, &mut self.lens) else {
            return false;
        };
        let Some(bindings) = lens.poll(scope) else {
            return false;
        };

        self.evaluations += 1;
        let value = match engine.evaluate(formula, bindings) {
            Ok(value) => value,
            Err(e) => {
                diagnostics.report(self.id, DiagnosticKind::Eval(e.to_string()));
                None
            }
        };

        let changed = !same_value(self.value, value);
        self.value = value;
        changed
    }

    /// The target publication, once the cell has both a name and a formula.
    pub(crate) fn target(&self) -> Option<Reducer> {
        let name = self.name.as_ref()?;
        let formula = self.formula.as_ref()?;
        Some(Reducer::Set {
            name: name.clone(),
            owner: self.id,
            value: self.value,
            formula: formula.text().to_string(),
        })
    }

    /// Schedule teardown and stop taking edits. Returns the last known name
    /// (empty if the cell never had one), or `None` if already removing.
    pub(crate) fn request_removal(&mut self, teardown_at: Instant) -> Option<String> {
        if self.is_removing() {
            return None;
        }
        self.name_edit.cancel();
        self.formula_edit.cancel();
        self.teardown_at = Some(teardown_at);
        Some(self.name.clone().unwrap_or_default())
    }
}

/// Cells indexed by id, plus the collection order used for display.
///
/// Ids are never reused: a removed cell leaves a `None` tombstone in its
/// slot for the life of the sheet. Cells are boxed so a tombstone costs one
/// pointer.
#[derive(Default)]
pub(crate) struct CellArena {
    slots: Vec<Option<Box<Cell>>>,
    order: Vec<CellId>,
}

impl CellArena {
    /// Allocate the next id and append the cell to the collection.
    pub(crate) fn insert_with(&mut self, make: impl FnOnce(CellId) -> Cell) -> CellId {
        let id = CellId::new(self.slots.len());
        self.slots.push(Some(Box::new(make(id))));
        self.order.push(id);
        id
    }

    pub(crate) fn get(&self, id: CellId) -> Option<&Cell> {
        self.slots.get(id.index()).and_then(|slot| slot.as_deref())
    }

    pub(crate) fn get_mut(&mut self, id: CellId) -> Option<&mut Cell> {
        self.slots.get_mut(id.index()).and_then(|slot| slot.as_deref_mut())
    }

    pub(crate) fn remove(&mut self, id: CellId) -> Option<Cell> {
        let cell = self.slots.get_mut(id.index())?.take()?;
        self.order.retain(|other| *other != id);
        Some(*cell)
    }

    pub(crate) fn len(&self) -> usize {
        self.order.len()
    }

    /// Live cells in collection order.
    pub(crate) fn iter(&self) -> impl Iterator<Item = &Cell> {
        self.order.iter().filter_map(|id| self.get(*id))
    }
}
