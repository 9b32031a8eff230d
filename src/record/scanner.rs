//! Record scanner
//!
//! Linear scan over raw file bytes yielding every framed candidate.

use super::{START_MARKER, TERMINATOR};

/// A framed byte range found by the scanner. Not yet decoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RawRecord<'a> {
    /// Offset of the start marker in the file
    pub offset: u64,

    /// Bytes between the start marker and the terminator
    pub payload: &'a [u8],
}

impl RawRecord<'_> {
    /// Length including start marker and terminator
    pub fn framed_len(&self) -> usize {
        self.payload.len() + 2
    }
}

/// Iterator over raw records in ascending offset order
///
/// Tracks the most recent start marker since the last terminator; each
/// terminator closes the candidate opened by that marker. A terminator
/// with no open marker (slot padding, overwritten tails) yields nothing.
pub struct RecordScanner<'a> {
    data: &'a [u8],
    pos: usize,
}

impl<'a> RecordScanner<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, pos: 0 }
    }
}

impl<'a> Iterator for RecordScanner<'a> {
    type Item = RawRecord<'a>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut start: Option<usize> = None;

        while self.pos < self.data.len() {
            let i = self.pos;
            self.pos += 1;

            match self.data[i] {
                START_MARKER => start = Some(i),
                TERMINATOR => {
                    if let Some(s) = start.take() {
                        return Some(RawRecord {
                            offset: s as u64,
                            payload: &self.data[s + 1..i],
                        });
                    }
                }
                _ => {}
            }
        }

        None
    }
}
