//! Key Index Module
//!
//! In-memory map from key to the slot and record currently holding it.
//!
//! ## Responsibilities
//! - Answer get/has/keys without I/O
//! - Remember each key's slot so the next write can free it
//!
//! Only live keys are indexed. Tombstones are written to disk but never
//! kept here.

mod table;

pub use table::KeyIndex;

use serde_json::Value;

use crate::allocator::{slot_size, Slot};
use crate::record::Record;

/// The authoritative record for one key while the store is open
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Byte offset of the record's start marker
    pub offset: u64,

    /// Size class of the slot; only ever grows for a given key
    pub size_class: u8,

    /// The current record
    pub record: Record,
}

impl Entry {
    pub fn new(offset: u64, size_class: u8, record: Record) -> Self {
        Self {
            offset,
            size_class,
            record,
        }
    }

    pub fn slot(&self) -> Slot {
        Slot::new(self.offset, self.size_class)
    }

    /// Byte length of this entry's slot
    pub fn slot_len(&self) -> u64 {
        slot_size(self.size_class)
    }

    pub fn value(&self) -> Option<&Value> {
        self.record.value.as_ref()
    }
}
