//! Push/pop back-patching (spec §4.3): reserve a fixed number of bytes for a field whose
//! value depends on downstream bytes (an enclosing length, or a CRC32-C), then revisit that
//! position once the value is known.
//!
//! Grounded on `original_source/real_encoder.go`'s `pushLength`/`pop` pair and
//! `real_decoder.go`'s mirrored `push`/`pop`. The stack itself is never materialized as a
//! `Vec` here: because message structs already know their own `size()` up front (the
//! two-pass encoder has already run the sizing pass), each push/pop site is a single
//! (reserve, write body, patch) call rather than a LIFO of pending finalizers — the spec's
//! "flat vector of (saved_offset, reserved_bytes, finalizer)" collapses to a call stack.

use crc32c::crc32c;

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::DecodeResult;
use crate::encode::EncodeResult;
use crate::traits::corrupt_frame_err;

/// Marks where a reserved length field begins, for [`pop_length_i32`].
#[derive(Debug, Clone, Copy)]
pub struct LengthMark(usize);

/// Reserves 4 bytes for a length that will be known only after the enclosed region is
/// written.
pub fn push_length_i32(dst: &mut WriteCursor<'_>) -> EncodeResult<LengthMark> {
    let mark = LengthMark(dst.pos());
    dst.write_i32_be(0)?;
    Ok(mark)
}

/// Patches the reserved slot with the byte count of everything written since the reservation
/// (not counting the 4 reserved bytes themselves).
pub fn pop_length_i32(dst: &mut WriteCursor<'_>, mark: LengthMark) {
    let enclosed = dst.pos() - mark.0 - 4;
    // `enclosed` is a byte count of an already-allocated buffer; it cannot exceed `i32::MAX`.
    dst.patch_u32_be_at(mark.0, enclosed as u32);
}

/// Marks where a reserved CRC32-C field begins, for [`pop_crc32c`].
#[derive(Debug, Clone, Copy)]
pub struct CrcMark(usize);

/// Reserves 4 bytes for a CRC32-C that covers everything written after it.
pub fn push_crc32c(dst: &mut WriteCursor<'_>) -> EncodeResult<CrcMark> {
    let mark = CrcMark(dst.pos());
    dst.write_u32_be(0)?;
    Ok(mark)
}

/// Computes CRC32-C over the bytes written since the reservation and patches it in.
pub fn pop_crc32c(dst: &mut WriteCursor<'_>, mark: CrcMark) {
    let covered = dst.written_since(mark.0 + 4);
    let checksum = crc32c(covered);
    dst.patch_u32_be_at(mark.0, checksum);
}

/// Reads a 4-byte length prefix, then runs `body` bounded to exactly that many bytes,
/// verifying afterward that `body` consumed the whole declared region (spec §4.3: "pop
/// verifies that the number of bytes consumed equals the declared length").
pub fn with_length_i32_prefix<'de, T>(
    src: &mut ReadCursor<'de>,
    context: &'static str,
    body: impl FnOnce(&mut ReadCursor<'de>) -> DecodeResult<T>,
) -> DecodeResult<T> {
    let declared = src.read_i32_be()?;
    if declared < 0 {
        return Err(corrupt_frame_err(context, "negative enclosed length"));
    }
    let declared = declared as usize;
    let start = src.pos();
    let value = body(src)?;
    let consumed = src.pos() - start;
    if consumed != declared {
        return Err(corrupt_frame_err(
            context,
            "declared length does not match bytes consumed",
        ));
    }
    Ok(value)
}

/// Reads a 4-byte CRC32-C, then runs `body`, verifying the checksum over the bytes `body`
/// consumed.
pub fn with_crc32c<'de, T>(
    src: &mut ReadCursor<'de>,
    context: &'static str,
    body: impl FnOnce(&mut ReadCursor<'de>) -> DecodeResult<T>,
) -> DecodeResult<T> {
    let declared = src.read_u32_be()?;
    let start = src.pos();
    let value = body(src)?;
    let end = src.pos();
    let actual = crc32c(&src.inner()[start..end]);
    if actual != declared {
        return Err(corrupt_frame_err(context, "CRC32-C mismatch"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_prefix_round_trips() {
        let mut buf = [0u8; 16];
        {
            let mut w = WriteCursor::new(&mut buf);
            let mark = push_length_i32(&mut w).unwrap();
            w.write_slice(b"hello").unwrap();
            pop_length_i32(&mut w, mark);
        }
        let mut r = ReadCursor::new(&buf[..9]);
        let out = with_length_i32_prefix(&mut r, "test", |src| Ok(src.read_slice(5)?.to_vec())).unwrap();
        assert_eq!(out, b"hello");
    }

    #[test]
    fn crc_mismatch_is_corrupt_frame() {
        let mut buf = [0u8; 9];
        {
            let mut w = WriteCursor::new(&mut buf);
            let mark = push_crc32c(&mut w).unwrap();
            w.write_slice(b"hello").unwrap();
            pop_crc32c(&mut w, mark);
        }
        buf[8] ^= 0xff; // corrupt one payload byte after the CRC was computed
        let mut r = ReadCursor::new(&buf);
        let result = with_crc32c(&mut r, "test", |src| src.read_slice(5).map(<[u8]>::to_vec));
        assert!(result.is_err());
    }
}
