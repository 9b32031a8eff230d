//! Block allocator implementation
//!
//! Per-class free lists over a single file, plus a bump pointer.

use tracing::debug;

use super::size_class::slot_size;

/// A claimed byte range: `slot_size(size_class)` bytes at `offset`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Slot {
    pub offset: u64,
    pub size_class: u8,
}

impl Slot {
    pub fn new(offset: u64, size_class: u8) -> Self {
        Self { offset, size_class }
    }

    /// One past the last byte of the slot
    pub fn end(&self) -> u64 {
        self.offset + slot_size(self.size_class)
    }
}

/// Allocates slot offsets within the backing file
///
/// The allocator is pure bookkeeping: it never touches the file.
#[derive(Debug, Default)]
pub struct BlockAllocator {
    /// One stack of free offsets per size class
    free_lists: Vec<Vec<u64>>,

    /// First byte not claimed by any slot, live or free
    head: u64,
}

/// Snapshot of allocator state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AllocatorStats {
    /// High-water mark
    pub head: u64,

    /// Free slot count per size class
    pub free_slots: Vec<usize>,

    /// Total bytes sitting on free lists
    pub free_bytes: u64,
}

impl BlockAllocator {
    /// Create an empty allocator (head at offset 0)
    pub fn new() -> Self {
        Self::default()
    }

    fn free_list_mut(&mut self, class: u8) -> &mut Vec<u64> {
        let idx = class as usize;
        if self.free_lists.len() <= idx {
            self.free_lists.resize_with(idx + 1, Vec::new);
        }
        &mut self.free_lists[idx]
    }

    /// Hand out a slot of `class`
    ///
    /// Pops the most recently freed slot of that class if there is one,
    /// otherwise claims a fresh slot at `head`.
    pub fn allocate(&mut self, class: u8) -> u64 {
        if let Some(offset) = self.free_list_mut(class).pop() {
            debug!(offset, class, "reusing free slot");
            return offset;
        }

        let offset = self.head;
        self.head += slot_size(class);
        debug!(offset, class, head = self.head, "claimed new slot");
        offset
    }

    /// Return a slot to its class's free list. The caller vouches that
    /// `offset` really is a slot of `class`.
    pub fn free(&mut self, offset: u64, class: u8) {
        self.free_list_mut(class).push(offset);
    }

    /// Carve `[from, to)` into free slots of `class`
    ///
    /// Returns the offset where carving stopped; the remainder
    /// `[returned, to)` is shorter than one slot of `class`.
    pub fn reclaim(&mut self, mut from: u64, to: u64, class: u8) -> u64 {
        let size = slot_size(class);
        let list = self.free_list_mut(class);
        while to.saturating_sub(from) >= size {
            list.push(from);
            from += size;
        }
        from
    }

    /// Current high-water mark
    pub fn head(&self) -> u64 {
        self.head
    }

    /// Move the high-water mark. Only replay does this.
    pub(crate) fn set_head(&mut self, head: u64) {
        self.head = head;
    }

    /// Number of free slots in a class
    pub fn free_count(&self, class: u8) -> usize {
        self.free_lists
            .get(class as usize)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Free offsets of a class, oldest first
    pub fn free_slots(&self, class: u8) -> &[u64] {
        self.free_lists
            .get(class as usize)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn stats(&self) -> AllocatorStats {
        let free_slots: Vec<usize> = self.free_lists.iter().map(Vec::len).collect();
        let free_bytes = free_slots
            .iter()
            .enumerate()
            .map(|(class, &count)| count as u64 * slot_size(class as u8))
            .sum();

        AllocatorStats {
            head: self.head,
            free_slots,
            free_bytes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bump_allocation() {
        let mut alloc = BlockAllocator::new();

        assert_eq!(alloc.allocate(0), 0);
        assert_eq!(alloc.allocate(0), 256);
        assert_eq!(alloc.allocate(1), 512);
        assert_eq!(alloc.allocate(0), 1024);
        assert_eq!(alloc.head(), 1280);
    }

    #[test]
    fn test_lifo_reuse() {
        let mut alloc = BlockAllocator::new();

        let a = alloc.allocate(0);
        let b = alloc.allocate(0);
        let _c = alloc.allocate(0);
        let head = alloc.head();

        alloc.free(a, 0);
        alloc.free(b, 0);

        // Most recently freed comes back first
        assert_eq!(alloc.allocate(0), b);
        assert_eq!(alloc.allocate(0), a);
        assert_eq!(alloc.head(), head);

        // Lists exhausted: back to bumping
        assert_eq!(alloc.allocate(0), head);
    }

    #[test]
    fn test_free_lists_are_per_class() {
        let mut alloc = BlockAllocator::new();

        let small = alloc.allocate(0);
        alloc.free(small, 0);

        // A class 2 request must not take the class 0 slot
        let big = alloc.allocate(2);
        assert_ne!(big, small);
        assert_eq!(alloc.free_count(0), 1);
    }

    #[test]
    fn test_reclaim_carves_whole_slots() {
        let mut alloc = BlockAllocator::new();

        // 1300 bytes: two 512-byte slots, then 276 bytes left
        let stop = alloc.reclaim(0, 1300, 1);
        assert_eq!(stop, 1024);
        assert_eq!(alloc.free_slots(1), &[0, 512]);

        // Remainder: one 256-byte slot, 20 bytes leak
        let stop = alloc.reclaim(stop, 1300, 0);
        assert_eq!(stop, 1280);
        assert_eq!(alloc.free_slots(0), &[1024]);
    }

    #[test]
    fn test_reclaim_empty_range() {
        let mut alloc = BlockAllocator::new();
        assert_eq!(alloc.reclaim(512, 512, 0), 512);
        assert_eq!(alloc.reclaim(600, 512, 0), 600);
        assert_eq!(alloc.free_count(0), 0);
    }

    #[test]
    fn test_stats() {
        let mut alloc = BlockAllocator::new();
        let a = alloc.allocate(1);
        let _ = alloc.allocate(0);
        alloc.free(a, 1);

        let stats = alloc.stats();
        assert_eq!(stats.head, 768);
        assert_eq!(stats.free_slots, vec![0, 1]);
        assert_eq!(stats.free_bytes, 512);
    }
}
