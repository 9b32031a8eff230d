//! Recovery Module
//!
//! Rebuilds the key index and the free-space map from the raw bytes of
//! the backing file.
//!
//! ## Steps
//! 1. Scan for framed candidates; decode each, silently skip failures
//! 2. Per key, keep the candidate with the greatest sequence
//! 3. Filter candidates down to the winners (ascending offset)
//! 4. Carve the gaps between winners into free slots; tombstone winners
//!    occupy their slot like live records
//! 5. Index the live winners, drop the tombstones
//!
//! Gaps are carved with the largest winning size class first, then the
//! base class. A tail shorter than one base slot is not reclaimed and stays
//! leaked for the life of the open store.

use std::collections::HashMap;

use tracing::debug;

use crate::allocator::{size_class_for, BlockAllocator, Slot, BASE_BLOCK};
use crate::index::{Entry, KeyIndex};
use crate::record::{Record, RecordCodec, RecordScanner};

/// A successfully decoded record found during the scan
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Offset of the record's start marker
    pub offset: u64,

    /// Size class derived from the framed length
    pub size_class: u8,

    pub record: Record,
}

impl Candidate {
    pub fn slot(&self) -> Slot {
        Slot::new(self.offset, self.size_class)
    }
}

/// Statistics from a replay
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecoveryResult {
    /// Framed records that decoded, including superseded ones
    pub records_recovered: u64,

    /// Framed records that failed to decode (torn writes)
    pub records_corrupted: u64,

    /// Keys present in the rebuilt index
    pub live_keys: u64,

    /// Winning tombstones (still occupying a slot)
    pub tombstones: u64,

    /// Greatest sequence seen; the resumed logical clock
    pub last_sequence: u64,

    /// Bytes in inter-record gaps too small to become a slot
    pub leaked_bytes: u64,

    /// High-water mark after replay
    pub head: u64,
}

/// In-memory state reconstructed by `replay`
#[derive(Debug)]
pub struct Recovered {
    pub index: KeyIndex,
    pub allocator: BlockAllocator,
    pub tick: u64,
    pub result: RecoveryResult,
}

/// Replay `data` (the full file contents) into fresh store state
pub fn replay(data: &[u8], codec: &dyn RecordCodec) -> Recovered {
    let (candidates, corrupted) = scan_candidates(data, codec);
    let records_recovered = candidates.len() as u64;

    let (winners, tick) = resolve_winners(candidates);

    let mut allocator = BlockAllocator::new();
    let leaked_bytes = rebuild_free_space(&winners, &mut allocator);

    let mut index = KeyIndex::new();
    let mut tombstones = 0u64;
    for winner in winners {
        if winner.record.is_tombstone() {
            tombstones += 1;
            continue;
        }
        index.insert(Entry::new(winner.offset, winner.size_class, winner.record));
    }

    let result = RecoveryResult {
        records_recovered,
        records_corrupted: corrupted,
        live_keys: index.len() as u64,
        tombstones,
        last_sequence: tick,
        leaked_bytes,
        head: allocator.head(),
    };

    Recovered {
        index,
        allocator,
        tick,
        result,
    }
}

/// Step 1: decode every framed record, in ascending offset order
///
/// Returns the candidates and the number of frames that failed to decode.
pub fn scan_candidates(data: &[u8], codec: &dyn RecordCodec) -> (Vec<Candidate>, u64) {
    let mut candidates = Vec::new();
    let mut corrupted = 0u64;

    for raw in RecordScanner::new(data) {
        match codec.decode(raw.payload) {
            Some(record) => candidates.push(Candidate {
                offset: raw.offset,
                size_class: size_class_for(raw.framed_len()),
                record,
            }),
            None => {
                corrupted += 1;
                debug!(offset = raw.offset, len = raw.framed_len(), "skipping undecodable record");
            }
        }
    }

    (candidates, corrupted)
}

/// Steps 2-3: keep the highest-sequence candidate per key
///
/// Returns winners in their original (ascending offset) order, and the
/// greatest sequence across all candidates.
pub fn resolve_winners(candidates: Vec<Candidate>) -> (Vec<Candidate>, u64) {
    let mut tick = 0u64;
    let mut is_winner = vec![false; candidates.len()];

    {
        let mut latest: HashMap<&str, (u64, usize)> = HashMap::new();

        for (i, candidate) in candidates.iter().enumerate() {
            let seq = candidate.record.sequence;
            tick = tick.max(seq);

            let best = latest.entry(candidate.record.key.as_str()).or_insert((seq, i));
            if seq > best.0 {
                *best = (seq, i);
            }
        }

        for &(_, i) in latest.values() {
            is_winner[i] = true;
        }
    }

    let winners = candidates
        .into_iter()
        .zip(is_winner)
        .filter_map(|(candidate, win)| win.then_some(candidate))
        .collect();

    (winners, tick)
}

/// Steps 4-5: carve unused ranges between winners into free slots
///
/// `winners` must be in ascending offset order. Sets the allocator's head
/// to the end of the last winner's slot and returns the leaked byte count.
pub fn rebuild_free_space(winners: &[Candidate], allocator: &mut BlockAllocator) -> u64 {
    let max_class = winners.iter().map(|w| w.size_class).max().unwrap_or(0);

    let mut cursor = 0u64;
    let mut leaked = 0u64;

    for winner in winners {
        if winner.offset > cursor {
            let stop = allocator.reclaim(cursor, winner.offset, max_class);
            let stop = allocator.reclaim(stop, winner.offset, 0);
            let gap_leak = winner.offset - stop;
            debug_assert!(gap_leak < BASE_BLOCK);
            leaked += gap_leak;
        }
        cursor = cursor.max(winner.slot().end());
    }

    allocator.set_head(cursor);
    leaked
}
