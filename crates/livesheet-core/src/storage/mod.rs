//! Storage collaborator: an opaque string key-value service.
//!
//! The sheet reads [`FORMULAS_KEY`] once at bootstrap and writes it once per
//! distinct persisted state.

mod file;

pub use file::FileStorage;

use crate::error::Result;
use std::collections::HashMap;

/// Key under which the JSON name → formula mapping is stored.
pub const FORMULAS_KEY: &str = "formulas";

pub trait Storage {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&mut self, key: &str, value: &str) -> Result<()>;
}

/// In-process storage that counts writes.
#[derive(Clone, Debug, Default)]
pub struct MemoryStorage {
    entries: HashMap<String, String>,
    writes: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Storage pre-seeded with one entry (not counted as a write).
    pub fn with_entry(key: &str, value: &str) -> Self {
        let mut storage = Self::new();
        storage.entries.insert(key.to_string(), value.to_string());
        storage
    }

    pub fn entry(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Number of `set` calls so far.
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl Storage for MemoryStorage {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.writes += 1;
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_storage_counts_writes() {
        let mut storage = MemoryStorage::with_entry(FORMULAS_KEY, "{}");
        assert_eq!(storage.writes(), 0);
        assert_eq!(storage.get(FORMULAS_KEY).unwrap().as_deref(), Some("{}"));

        storage.set(FORMULAS_KEY, r#"{"a":"1"}"#).unwrap();
        assert_eq!(storage.writes(), 1);
        assert_eq!(storage.entry(FORMULAS_KEY), Some(r#"{"a":"1"}"#));
        assert_eq!(storage.get("missing").unwrap(), None);
    }
}
