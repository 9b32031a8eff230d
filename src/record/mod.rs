//! Record Module
//!
//! Self-delimited on-disk records and the codec that produces them.
//!
//! ## Responsibilities
//! - Define the `(sequence, key, value)` record triple
//! - Encode/decode record payloads through an injectable codec
//! - Frame payloads with start marker and terminator bytes
//! - Scan raw file bytes for candidate records during replay
//!
//! ## Record Format
//! ```text
//! ┌──────────┬──────────────────────────────┬────────────┬─────────────┐
//! │ 0x09 (1) │ payload: [seq, key, value?]  │ 0x0A (1)   │ padding ... │
//! └──────────┴──────────────────────────────┴────────────┴─────────────┘
//! |<--------------------- slot (256 << size_class) ------------------->|
//! ```
//!
//! A tombstone is a record without its third element.

mod entry;
mod codec;
mod scanner;

pub use entry::Record;
pub use codec::{frame, encode_framed, JsonCodec, RecordCodec, START_MARKER, TERMINATOR};
pub use scanner::{RawRecord, RecordScanner};
