//! Forward-compatible tagged-field arrays for flexible-version messages (spec §4.5).
//!
//! On the wire this is just `uvarint field_count` followed by that many
//! `(tag uvarint, length uvarint, length raw bytes)` triples. Every message we implement
//! only ever writes the empty array; decoding must still tolerate — and discard — a
//! non-empty one written by a newer peer (spec §8 property 5).

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::DecodeResult;
use crate::encode::EncodeResult;

/// Writes `uvarint 0`: no tagged fields (every message we encode is current).
pub fn write_empty_tagged_fields(dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
    dst.write_uvarint(0)
}

/// Reads a tagged-field array and discards its contents. Unknown tags are never an error
/// (spec §4.5): the whole point is that a future field we don't know about is safely
/// skippable.
pub fn skip_tagged_fields(src: &mut ReadCursor<'_>) -> DecodeResult<()> {
    let count = src.read_uvarint()?;
    for _ in 0..count {
        let _tag = src.read_uvarint()?;
        let len = src.read_uvarint()?;
        src.read_slice(len as usize)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_empty_tagged_fields_are_skipped() {
        let mut buf = [0u8; 8];
        {
            let mut w = WriteCursor::new(&mut buf);
            w.write_uvarint(1).unwrap(); // one tagged field
            w.write_uvarint(7).unwrap(); // tag id
            w.write_uvarint(3).unwrap(); // length
            w.write_slice(b"xyz").unwrap();
        }
        let mut r = ReadCursor::new(&buf[..6]);
        skip_tagged_fields(&mut r).unwrap();
        assert!(r.eof());
    }

    #[test]
    fn empty_tagged_fields_round_trip() {
        let mut buf = [0u8; 1];
        WriteCursor::new(&mut buf).write_uvarint(0).unwrap();
        let mut r = ReadCursor::new(&buf);
        skip_tagged_fields(&mut r).unwrap();
        assert!(r.eof());
    }
}
