//! Change propagation through the name → subscriber index.
//!
//! A wave starts from the names whose scope slots changed. It collects every
//! transitively dependent cell, orders them so each comes after any dirty
//! owner of its inputs, and walks that order once. A cell re-evaluates only
//! when one of its inputs actually changed earlier in the wave, so every
//! evaluation sees a consistent snapshot and each cell evaluates at most
//! once. Cells on a dependency cycle are released lowest id first.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};

use super::{CellId, Sheet};
use crate::storage::Storage;

impl<S: Storage> Sheet<S> {
    pub(crate) fn propagate(&mut self, changed: Vec<String>) {
        if changed.is_empty() {
            return;
        }

        let mut changed: HashSet<String> = changed.into_iter().collect();
        let dirty = self.dirty_closure(&changed);
        let order = self.settle_order(&dirty);
        log::trace!("propagating {} names to {} cells", changed.len(), order.len());

        for id in order {
            let Some(cell) = self.arena.get_mut(id) else {
                continue;
            };
            if !cell.inputs().iter().any(|name| changed.contains(name)) {
                continue;
            }
            if !cell.recompute(&self.engine, &self.scope, &mut self.diagnostics) {
                continue;
            }
            if let Some(name) = cell.name() {
                if self.scope.publish_value(name, id, cell.value()) {
                    changed.insert(name.to_string());
                }
            }
        }
    }

    /// Cells reading any of `changed`, directly or through other cells.
    fn dirty_closure(&self, changed: &HashSet<String>) -> BTreeSet<CellId> {
        let mut dirty = BTreeSet::new();
        let mut seen: HashSet<&str> = HashSet::new();
        let mut queue: VecDeque<&str> = changed.iter().map(String::as_str).collect();

        while let Some(name) = queue.pop_front() {
            if !seen.insert(name) {
                continue;
            }
            for id in self.scope.subscribers(name) {
                if dirty.insert(id) {
                    if let Some(own) = self.arena.get(id).and_then(|cell| cell.name()) {
                        queue.push_back(own);
                    }
                }
            }
        }
        dirty
    }

    /// Topological order of `dirty` over "owner of an input" edges.
    fn settle_order(&self, dirty: &BTreeSet<CellId>) -> Vec<CellId> {
        // Dirty upstream owners not yet settled, per cell
        let mut waiting: BTreeMap<CellId, usize> = BTreeMap::new();
        let mut downstream: HashMap<CellId, Vec<CellId>> = HashMap::new();

        for &id in dirty {
            let mut count = 0;
            if let Some(cell) = self.arena.get(id) {
                for owner in cell.inputs().iter().filter_map(|name| self.scope.owner(name)) {
                    if owner != id && dirty.contains(&owner) {
                        downstream.entry(owner).or_default().push(id);
                        count += 1;
                    }
                }
            }
            waiting.insert(id, count);
        }

        let mut ready: BTreeSet<CellId> = waiting
            .iter()
            .filter(|(_, count)| **count == 0)
            .map(|(id, _)| *id)
            .collect();
        let mut order = Vec::with_capacity(dirty.len());

        loop {
            let next = match ready.pop_first() {
                Some(id) => id,
                // Only cycles (and what they feed) remain.
                None => match waiting.keys().next() {
                    Some(id) => *id,
                    None => break,
                },
            };
            if waiting.remove(&next).is_none() {
                continue;
            }
            order.push(next);

            for after in downstream.get(&next).into_iter().flatten() {
                if let Some(count) = waiting.get_mut(after) {
                    *count = count.saturating_sub(1);
                    if *count == 0 {
                        ready.insert(*after);
                    }
                }
            }
        }
        order
    }
}
