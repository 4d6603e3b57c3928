use livesheet_engine::engine::is_reserved;
use std::time::Instant;

use super::cell::{Cell, Timer};
use super::fold::Reducer;
use super::{CellId, Sheet};
use crate::diagnostics::DiagnosticKind;
use crate::error::{Result, SheetError};
use crate::storage::Storage;

impl<S: Storage> Sheet<S> {
    /// Append a new, empty cell to the sheet.
    pub fn add_cell(&mut self) -> CellId {
        let config = self.config;
        let id = self.arena.insert_with(|id| Cell::new(id, &config));
        log::debug!("added cell {}", id);
        id
    }

    /// Record a raw name edit. It takes effect once the field has been quiet
    /// for the name debounce window.
    pub fn edit_name(&mut self, id: CellId, text: impl Into<String>, now: Instant) -> Result<()> {
        let cell = self.arena.get_mut(id).ok_or(SheetError::UnknownCell(id))?;
        cell.edit_name(text.into(), now);
        Ok(())
    }

    /// Record a raw formula edit. It takes effect once the field has been
    /// quiet for the formula debounce window.
    pub fn edit_formula(&mut self, id: CellId, text: impl Into<String>, now: Instant) -> Result<()> {
        let cell = self.arena.get_mut(id).ok_or(SheetError::UnknownCell(id))?;
        cell.edit_formula(text.into(), now);
        Ok(())
    }

    /// Remove a cell. Its name leaves the scope and persisted state right
    /// away; its subscriptions are torn down after the removal delay.
    pub fn remove_cell(&mut self, id: CellId, now: Instant) -> Result<()> {
        let teardown_at = now + self.config.removal_delay;
        let cell = self.arena.get_mut(id).ok_or(SheetError::UnknownCell(id))?;
        let Some(name) = cell.request_removal(teardown_at) else {
            return Ok(());
        };
        log::info!("removing cell {} (`{}`)", id, name);
        self.fold(vec![Reducer::Omit { name, owner: id }]);
        Ok(())
    }

    /// Earliest pending timer across all cells.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.next_due(None).map(|(at, _, _)| at)
    }

    /// Fire every timer due at or before `now`, in deadline order.
    pub fn advance(&mut self, now: Instant) {
        while let Some((_, id, timer)) = self.next_due(Some(now)) {
            self.fire(id, timer);
        }
    }

    /// Fire every pending timer, in deadline order, without waiting.
    pub fn flush(&mut self) {
        while let Some((_, id, timer)) = self.next_due(None) {
            self.fire(id, timer);
        }
    }

    fn next_due(&self, limit: Option<Instant>) -> Option<(Instant, CellId, Timer)> {
        self.arena
            .iter()
            .filter_map(|cell| {
                let (at, timer) = cell.next_timer()?;
                Some((at, cell.id(), timer))
            })
            .filter(|(at, _, _)| limit.is_none_or(|limit| *at <= limit))
            .min_by_key(|(at, id, timer)| (*at, *id, *timer))
    }

    fn fire(&mut self, id: CellId, timer: Timer) {
        match timer {
            Timer::NameEdit => self.fire_name_edit(id),
            Timer::FormulaEdit => self.fire_formula_edit(id),
            Timer::Teardown => self.teardown(id),
        }
    }

    fn fire_name_edit(&mut self, id: CellId) {
        let Some(text) = self.arena.get_mut(id).and_then(Cell::take_name_edit) else {
            return;
        };
        let name = text.trim();
        if name.is_empty() {
            return;
        }
        if is_reserved(name) {
            self.diagnostics
                .report(id, DiagnosticKind::ReservedName(name.to_string()));
            return;
        }
        self.apply_name(id, name.to_string());
    }

    /// Accept a name and fold the rename signal and target publication.
    pub(crate) fn apply_name(&mut self, id: CellId, name: String) {
        let Some(cell) = self.arena.get_mut(id) else {
            return;
        };
        let Some(change) = cell.accept_name(name) else {
            return;
        };

        let mut reducers = Vec::new();
        if let Some(previous) = change.previous {
            log::info!(
                "cell {} renamed `{}` -> `{}`; formulas reading `{}` are not rewritten",
                id,
                previous,
                change.current,
                previous
            );
            reducers.push(Reducer::Omit {
                name: previous,
                owner: id,
            });
        }
        reducers.extend(cell.target());
        self.fold(reducers);
    }

    fn fire_formula_edit(&mut self, id: CellId) {
        let Some(text) = self.arena.get_mut(id).and_then(Cell::take_formula_edit) else {
            return;
        };
        self.apply_formula(id, text);
    }

    /// Compile and accept formula text, folding the target publication.
    pub(crate) fn apply_formula(&mut self, id: CellId, text: String) {
        let Some(cell) = self.arena.get_mut(id) else {
            return;
        };
        if cell.accept_formula(text, &self.engine, &mut self.scope, &mut self.diagnostics) {
            let target = cell.target();
            self.fold(target.into_iter().collect());
        }
    }

    fn teardown(&mut self, id: CellId) {
        if let Some(cell) = self.arena.remove(id) {
            self.scope.unsubscribe(id, cell.inputs());
            log::debug!("cell {} torn down", id);
        }
    }
}
