//! The shared scope: cell name → latest value, plus the subscriber index.
//!
//! Every slot remembers which cell published it. Value updates only land
//! while that cell still owns the slot, so a later publication under the
//! same name wins until it is omitted.

use indexmap::IndexMap;
use livesheet_engine::engine::{ScopeSource, Value};
use std::collections::{BTreeSet, HashMap};

use super::CellId;

#[derive(Clone, Copy, Debug)]
struct Slot {
    owner: CellId,
    value: Value,
}

/// Live name → value mapping shared (read-only) by every cell of a sheet.
#[derive(Debug, Default)]
pub struct Scope {
    slots: IndexMap<String, Slot>,
    /// Reverse index: name -> cells whose formula reads it
    subscribers: HashMap<String, BTreeSet<CellId>>,
}

/// Value equality that treats identical NaN payloads as equal.
pub(crate) fn same_value(a: Value, b: Value) -> bool {
    match (a, b) {
        (Some(x), Some(y)) => x == y || x.to_bits() == y.to_bits(),
        (None, None) => true,
        _ => false,
    }
}

impl Scope {
    /// Value published under `name`. `Some(None)` means present but undefined.
    pub fn get(&self, name: &str) -> Option<Value> {
        self.slots.get(name).map(|slot| slot.value)
    }

    /// The cell whose publication currently occupies `name`.
    pub fn owner(&self, name: &str) -> Option<CellId> {
        self.slots.get(name).map(|slot| slot.owner)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.slots.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Cells subscribed to `name`, in id order.
    pub fn subscribers(&self, name: &str) -> impl Iterator<Item = CellId> + '_ {
        self.subscribers
            .get(name)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    pub(crate) fn subscribe(&mut self, id: CellId, vars: &[String]) {
        for name in vars {
            self.subscribers.entry(name.clone()).or_default().insert(id);
        }
    }

    pub(crate) fn unsubscribe(&mut self, id: CellId, vars: &[String]) {
        for name in vars {
            if let Some(ids) = self.subscribers.get_mut(name) {
                ids.remove(&id);
                if ids.is_empty() {
                    self.subscribers.remove(name);
                }
            }
        }
    }

    /// Fold "set name". Returns true if readers of `name` could observe a change.
    pub(crate) fn set(&mut self, name: &str, owner: CellId, value: Value) -> bool {
        match self.slots.get_mut(name) {
            Some(slot) => {
                let changed = slot.owner != owner || !same_value(slot.value, value);
                slot.owner = owner;
                slot.value = value;
                changed
            }
            None => {
                self.slots.insert(name.to_string(), Slot { owner, value });
                true
            }
        }
    }

    /// Fold "omit name". Only the owning cell can evict a slot.
    pub(crate) fn omit(&mut self, name: &str, owner: CellId) -> bool {
        if self.owner(name) != Some(owner) {
            return false;
        }
        self.slots.shift_remove(name).is_some()
    }

    /// A new value from an already-published cell. Ignored unless it owns the slot.
    pub(crate) fn publish_value(&mut self, name: &str, owner: CellId, value: Value) -> bool {
        match self.slots.get_mut(name) {
            Some(slot) if slot.owner == owner => {
                let changed = !same_value(slot.value, value);
                slot.value = value;
                changed
            }
            _ => false,
        }
    }
}

impl ScopeSource for Scope {
    fn lookup(&self, name: &str) -> Value {
        self.get(name).flatten()
    }
}
