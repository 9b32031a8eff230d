//! Key index implementation
//!
//! HashMap-based; no key ordering is promised.

use std::collections::HashMap;

use super::Entry;

/// Mapping key → Entry, unique keys
#[derive(Debug, Default)]
pub struct KeyIndex {
    entries: HashMap<String, Entry>,
}

impl KeyIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Entry> {
        self.entries.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut Entry> {
        self.entries.get_mut(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Insert or replace the entry for `entry.record.key`
    pub fn insert(&mut self, entry: Entry) -> Option<Entry> {
        self.entries.insert(entry.record.key.clone(), entry)
    }

    pub fn remove(&mut self, key: &str) -> Option<Entry> {
        self.entries.remove(key)
    }

    /// All live keys, unordered
    pub fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
