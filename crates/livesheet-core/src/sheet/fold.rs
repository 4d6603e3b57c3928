//! Fold reducers and the persisted name → formula mapping.
//!
//! Cells never write shared state. They emit reducers, and the sheet folds
//! each reducer into the scope first and the persisted state second, in
//! arrival order.

use indexmap::IndexMap;
use livesheet_engine::engine::Value;
use serde::{Deserialize, Serialize};

use super::{CellId, Sheet};
use crate::error::Result;
use crate::storage::{FORMULAS_KEY, Storage};

/// One step of the scope/persistence fold.
#[derive(Clone, Debug, PartialEq)]
pub(crate) enum Reducer {
    /// A cell published its name, formula text and current value.
    Set {
        name: String,
        owner: CellId,
        value: Value,
        formula: String,
    },
    /// A cell stopped answering to `name` (renamed or removed).
    Omit { name: String, owner: CellId },
}

/// Durable name → formula text mapping. Never holds computed values.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PersistedState(IndexMap<String, String>);

impl PersistedState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.0)?)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(name, text)| (name.as_str(), text.as_str()))
    }

    pub(crate) fn set(&mut self, name: &str, formula: &str) -> bool {
        if self.get(name) == Some(formula) {
            return false;
        }
        self.0.insert(name.to_string(), formula.to_string());
        true
    }

    pub(crate) fn omit(&mut self, name: &str) -> bool {
        self.0.shift_remove(name).is_some()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for PersistedState {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        PersistedState(
            iter.into_iter()
                .map(|(name, text)| (name.into(), text.into()))
                .collect(),
        )
    }
}

impl<S: Storage> Sheet<S> {
    /// Fold reducers into the scope and persisted state, propagate value
    /// changes to dependents, then write the persisted state if it changed.
    /// While restoring, propagation and the write wait for the whole restore.
    pub(crate) fn fold(&mut self, reducers: Vec<Reducer>) {
        let mut changed = Vec::new();

        for reducer in reducers {
            match reducer {
                Reducer::Set {
                    name,
                    owner,
                    value,
                    formula,
                } => {
                    if self.scope.set(&name, owner, value) {
                        changed.push(name.clone());
                    }
                    self.persisted.set(&name, &formula);
                }
                Reducer::Omit { name, owner } => {
                    // Nothing is ever published under the empty name.
                    if name.is_empty() {
                        continue;
                    }
                    // A colliding cell that won the slot keeps both entries.
                    if !self.scope.owner(&name).is_none_or(|o| o == owner) {
                        continue;
                    }
                    if self.scope.omit(&name, owner) {
                        changed.push(name.clone());
                    }
                    self.persisted.omit(&name);
                }
            }
        }

        if let Some(deferred) = self.deferred.as_mut() {
            deferred.extend(changed);
            return;
        }
        self.propagate(changed);
        self.persist();
    }

    /// Write the persisted state unless it matches the last write.
    pub(crate) fn persist(&mut self) {
        let json = match self.persisted.to_json() {
            Ok(json) => json,
            Err(e) => {
                log::error!("failed to encode formulas: {}", e);
                return;
            }
        };
        if json == self.last_written {
            return;
        }
        match self.storage.set(FORMULAS_KEY, &json) {
            Ok(()) => {
                log::debug!("persisted {} formulas", self.persisted.len());
                self.last_written = json;
            }
            Err(e) => log::error!("failed to persist formulas: {}", e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_preserves_insertion_order() {
        let state = PersistedState::from_json(r#"{"b":"1","a":"b + 1"}"#).unwrap();
        let names: Vec<_> = state.iter().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["b", "a"]);
        assert_eq!(state.to_json().unwrap(), r#"{"b":"1","a":"b + 1"}"#);
    }

    #[test]
    fn test_set_and_omit() {
        let mut state = PersistedState::new();
        assert!(state.set("a", "1"));
        assert!(!state.set("a", "1"));
        assert!(state.set("a", "2"));
        assert_eq!(state.get("a"), Some("2"));
        assert!(state.omit("a"));
        assert!(!state.omit("a"));
        assert!(state.is_empty());
    }

    #[test]
    fn test_overwrite_keeps_position() {
        let mut state: PersistedState = [("x", "1"), ("y", "2")].into_iter().collect();
        state.set("x", "3");
        assert_eq!(state.to_json().unwrap(), r#"{"x":"3","y":"2"}"#);
    }

    #[test]
    fn test_rejects_non_mapping_json() {
        assert!(PersistedState::from_json("[1, 2]").is_err());
        assert!(PersistedState::from_json(r#"{"a": 1}"#).is_err());
    }
}
