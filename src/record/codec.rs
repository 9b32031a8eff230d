//! Record codec
//!
//! Payload encoding plus the framing shared by every codec.
//!
//! A codec only produces the payload; `frame` wraps it in the start marker
//! and terminator. Because replay finds records by scanning for those two
//! bytes, a payload must never contain either of them.

use bytes::{BufMut, Bytes, BytesMut};
use serde_json::Value;

use crate::error::{FlatError, Result};

use super::Record;

/// Byte preceding every record payload (ASCII TAB)
pub const START_MARKER: u8 = b'\t';

/// Byte following every record payload (ASCII LF)
pub const TERMINATOR: u8 = b'\n';

/// Encodes and decodes record payloads
///
/// Implementations must be deterministic in output length for a given
/// record, since the allocator sizes slots from the encoded length.
pub trait RecordCodec: Send + Sync + 'static {
    /// Encode a record into a payload (without framing bytes)
    fn encode(&self, record: &Record) -> Result<Vec<u8>>;

    /// Decode a payload. `None` means the bytes are not a valid record;
    /// replay treats this as a torn write and skips it.
    fn decode(&self, payload: &[u8]) -> Option<Record>;
}

/// Default codec: a compact JSON array
///
/// - live record: `[sequence, "key", value]`
/// - tombstone:   `[sequence, "key"]`
///
/// Compact JSON escapes control characters inside strings, so a payload
/// never contains a raw TAB or LF.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl RecordCodec for JsonCodec {
    fn encode(&self, record: &Record) -> Result<Vec<u8>> {
        let mut row = Vec::with_capacity(3);
        row.push(Value::from(record.sequence));
        row.push(Value::String(record.key.clone()));
        if let Some(value) = &record.value {
            row.push(value.clone());
        }
        Ok(serde_json::to_vec(&Value::Array(row))?)
    }

    fn decode(&self, payload: &[u8]) -> Option<Record> {
        let row = match serde_json::from_slice::<Value>(payload).ok()? {
            Value::Array(row) => row,
            _ => return None,
        };

        let mut fields = row.into_iter();
        let sequence = fields.next()?.as_u64()?;
        let key = match fields.next()? {
            Value::String(key) => key,
            _ => return None,
        };
        let value = fields.next();

        // Anything past the third element is not a record we wrote
        if fields.next().is_some() {
            return None;
        }

        Some(Record {
            sequence,
            key,
            value,
        })
    }
}

/// Wrap a payload in start marker and terminator
pub fn frame(payload: &[u8]) -> Result<Bytes> {
    if let Some(pos) = payload
        .iter()
        .position(|&b| b == START_MARKER || b == TERMINATOR)
    {
        return Err(FlatError::Serialization(format!(
            "payload contains framing byte 0x{:02x} at position {}",
            payload[pos], pos
        )));
    }

    let mut buf = BytesMut::with_capacity(payload.len() + 2);
    buf.put_u8(START_MARKER);
    buf.put_slice(payload);
    buf.put_u8(TERMINATOR);
    Ok(buf.freeze())
}

/// Encode a record with `codec` and frame it
pub fn encode_framed(codec: &dyn RecordCodec, record: &Record) -> Result<Bytes> {
    let payload = codec.encode(record)?;
    frame(&payload)
}
