//! In-memory slot store.

use std::collections::BTreeMap;

use super::KeyValueStore;
use crate::error::Result;

/// A slot store held entirely in memory.
///
/// Counts writes so callers can observe when a full rewrite happened.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    slots: BTreeMap<String, Vec<u8>>,
    writes: usize,
}

impl MemoryStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of `set` calls so far.
    #[must_use]
    pub fn writes(&self) -> usize {
        self.writes
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.slots.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &[u8]) -> Result<()> {
        self.slots.insert(key.to_string(), value.to_vec());
        self.writes += 1;
        Ok(())
    }
}
