//! Record definition
//!
//! The unit persisted for every put and delete.

use serde_json::Value;

/// A single versioned record for one key
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    /// Logical clock value assigned at write time, unique per write
    pub sequence: u64,

    /// The key this record belongs to
    pub key: String,

    /// The stored value; `None` marks a tombstone
    pub value: Option<Value>,
}

impl Record {
    /// Create a live record
    pub fn new(sequence: u64, key: impl Into<String>, value: Value) -> Self {
        Self {
            sequence,
            key: key.into(),
            value: Some(value),
        }
    }

    /// Create a tombstone record
    pub fn tombstone(sequence: u64, key: impl Into<String>) -> Self {
        Self {
            sequence,
            key: key.into(),
            value: None,
        }
    }

    pub fn is_tombstone(&self) -> bool {
        self.value.is_none()
    }
}
