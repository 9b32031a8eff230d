//! Block Allocator Module
//!
//! Carves the backing file into power-of-two slots.
//!
//! ## Responsibilities
//! - Map a record length to the smallest size class that holds it
//! - Reuse freed slots per size class (LIFO)
//! - Bump-allocate new slots at the high-water mark
//!
//! ## Layout
//! ```text
//! offset 0                                                   head
//! ┌────────┬────────────────┬────────┬────────┬──────────────┐
//! │ 256 B  │     512 B      │ 256 B  │ 256 B  │  unclaimed   │
//! │ live   │     free       │ live   │ free   │              │
//! └────────┴────────────────┴────────┴────────┴──────────────┘
//! ```
//!
//! Slots never move and never shrink. Claims past `head` are append-only,
//! so two claimed slots can never overlap.

mod size_class;
mod block;

pub use size_class::{size_class_for, slot_size, BASE_BLOCK};
pub use block::{AllocatorStats, BlockAllocator, Slot};
