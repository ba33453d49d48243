//! String, byte-blob, and array shapes (spec §4.2): the eight ways a variable-length value
//! can be framed on the wire, layered on top of the primitives in [`crate::cursor`].
//!
//! Grounded on `original_source/real_encoder.go` / `real_decoder.go`'s `put*`/`get*` method
//! families (`putString`, `putNullableString`, `putCompactString`, `putCompactNullableString`,
//! `putBytes`, `putVarintBytes`, `putCompactBytes`, `putArrayLength`/`putCompactArrayLength`).

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::DecodeResult;
use crate::encode::EncodeResult;
use crate::macros::cast_length;
use crate::traits::{invalid_length_err, other_err};

/// Sanity bound on array/string lengths so pathological framing is rejected before
/// allocating (spec §3: "roughly 131 072 entries").
pub const LENGTH_SANITY_BOUND: i32 = 2 * 65536;

const CTX: &str = "shapes";

fn utf8(context: &'static str, bytes: &[u8]) -> DecodeResult<String> {
    std::str::from_utf8(bytes)
        .map(str::to_owned)
        .map_err(|e| other_err::<crate::decode::DecodeError>(context, "invalid utf-8").with_source(e))
}

// ---- String (int16 length, non-nullable; -1 read back as empty) ----

pub fn write_string(dst: &mut WriteCursor<'_>, value: &str) -> EncodeResult<()> {
    let len: i16 = cast_length!(CTX, "string length", value.len())?;
    dst.write_i16_be(len)?;
    dst.write_slice(value.as_bytes())
}

pub fn read_string(src: &mut ReadCursor<'_>) -> DecodeResult<String> {
    let len = src.read_i16_be()?;
    if len < -1 {
        return Err(invalid_length_err(CTX, "string length", "negative beyond null sentinel"));
    }
    if len <= 0 {
        return Ok(String::new());
    }
    utf8(CTX, src.read_slice(len as usize)?)
}

// ---- NullableString (int16 length, -1 = null) ----

pub fn write_nullable_string(dst: &mut WriteCursor<'_>, value: Option<&str>) -> EncodeResult<()> {
    match value {
        None => dst.write_i16_be(-1),
        Some(s) => write_string(dst, s),
    }
}

pub fn read_nullable_string(src: &mut ReadCursor<'_>) -> DecodeResult<Option<String>> {
    let len = src.read_i16_be()?;
    if len < -1 {
        return Err(invalid_length_err(CTX, "string length", "negative beyond null sentinel"));
    }
    if len == -1 {
        return Ok(None);
    }
    Ok(Some(utf8(CTX, src.read_slice(len as usize)?)?))
}

// ---- CompactString (uvarint length + 1, non-nullable) ----

pub fn write_compact_string(dst: &mut WriteCursor<'_>, value: &str) -> EncodeResult<()> {
    let len: u64 = cast_length!(CTX, "compact string length", value.len())?;
    dst.write_uvarint(len + 1)?;
    dst.write_slice(value.as_bytes())
}

pub fn read_compact_string(src: &mut ReadCursor<'_>) -> DecodeResult<String> {
    let raw = src.read_uvarint()?;
    if raw == 0 {
        return Err(invalid_length_err(CTX, "compact string length", "null not allowed here"));
    }
    utf8(CTX, src.read_slice((raw - 1) as usize)?)
}

// ---- CompactNullableString (uvarint, 0 = null, 1 = empty) ----
//
// spec §9 open question: the source this was distilled from never actually returns null for
// this shape; corrected here so 0 decodes to `None` and 1 decodes to `Some(String::new())`.

pub fn write_compact_nullable_string(dst: &mut WriteCursor<'_>, value: Option<&str>) -> EncodeResult<()> {
    match value {
        None => dst.write_uvarint(0),
        Some(s) => {
            let len: u64 = cast_length!(CTX, "compact nullable string length", s.len())?;
            dst.write_uvarint(len + 1)?;
            dst.write_slice(s.as_bytes())
        }
    }
}

pub fn read_compact_nullable_string(src: &mut ReadCursor<'_>) -> DecodeResult<Option<String>> {
    let raw = src.read_uvarint()?;
    if raw == 0 {
        return Ok(None);
    }
    if raw == 1 {
        return Ok(Some(String::new()));
    }
    Ok(Some(utf8(CTX, src.read_slice((raw - 1) as usize)?)?))
}

// ---- Bytes (int32 length, -1 = null) ----

pub fn write_bytes(dst: &mut WriteCursor<'_>, value: Option<&[u8]>) -> EncodeResult<()> {
    match value {
        None => dst.write_i32_be(-1),
        Some(b) => {
            let len: i32 = cast_length!(CTX, "bytes length", b.len())?;
            dst.write_i32_be(len)?;
            dst.write_slice(b)
        }
    }
}

pub fn read_bytes(src: &mut ReadCursor<'_>) -> DecodeResult<Option<Vec<u8>>> {
    let len = src.read_i32_be()?;
    if len < -1 {
        return Err(invalid_length_err(CTX, "bytes length", "negative beyond null sentinel"));
    }
    if len == -1 {
        return Ok(None);
    }
    Ok(Some(src.read_slice(len as usize)?.to_vec()))
}

// ---- VarintBytes (zig-zag varint length, -1 = null) ----

pub fn write_varint_bytes(dst: &mut WriteCursor<'_>, value: Option<&[u8]>) -> EncodeResult<()> {
    match value {
        None => dst.write_varint(-1),
        Some(b) => {
            let len: i64 = cast_length!(CTX, "varint bytes length", b.len())?;
            dst.write_varint(len)?;
            dst.write_slice(b)
        }
    }
}

pub fn read_varint_bytes(src: &mut ReadCursor<'_>) -> DecodeResult<Option<Vec<u8>>> {
    let len = src.read_varint()?;
    if len < -1 {
        return Err(invalid_length_err(CTX, "varint bytes length", "negative beyond null sentinel"));
    }
    if len == -1 {
        return Ok(None);
    }
    Ok(Some(src.read_slice(len as usize)?.to_vec()))
}

// ---- CompactBytes (uvarint length + 1, 0 = null) ----

pub fn write_compact_bytes(dst: &mut WriteCursor<'_>, value: Option<&[u8]>) -> EncodeResult<()> {
    match value {
        None => dst.write_uvarint(0),
        Some(b) => {
            let len: u64 = cast_length!(CTX, "compact bytes length", b.len())?;
            dst.write_uvarint(len + 1)?;
            dst.write_slice(b)
        }
    }
}

pub fn read_compact_bytes(src: &mut ReadCursor<'_>) -> DecodeResult<Option<Vec<u8>>> {
    let raw = src.read_uvarint()?;
    if raw == 0 {
        return Ok(None);
    }
    Ok(Some(src.read_slice((raw - 1) as usize)?.to_vec()))
}

// ---- Arrays: int32 count (-1 = null), compact uvarint count + 1 (0 = null) ----

fn check_array_len(len: i32) -> DecodeResult<()> {
    if len > LENGTH_SANITY_BOUND {
        return Err(invalid_length_err(CTX, "array length", "exceeds sanity bound"));
    }
    Ok(())
}

pub fn write_array<T>(
    dst: &mut WriteCursor<'_>,
    value: Option<&[T]>,
    write_elem: impl Fn(&mut WriteCursor<'_>, &T) -> EncodeResult<()>,
) -> EncodeResult<()> {
    match value {
        None => dst.write_i32_be(-1),
        Some(items) => {
            let len: i32 = cast_length!(CTX, "array length", items.len())?;
            dst.write_i32_be(len)?;
            for item in items {
                write_elem(dst, item)?;
            }
            Ok(())
        }
    }
}

pub fn read_array<T>(
    src: &mut ReadCursor<'_>,
    read_elem: impl Fn(&mut ReadCursor<'_>) -> DecodeResult<T>,
) -> DecodeResult<Option<Vec<T>>> {
    let len = src.read_i32_be()?;
    if len < -1 {
        return Err(invalid_length_err(CTX, "array length", "negative beyond null sentinel"));
    }
    if len == -1 {
        return Ok(None);
    }
    check_array_len(len)?;
    let mut items = Vec::with_capacity((len as usize).min(4096));
    for _ in 0..len {
        items.push(read_elem(src)?);
    }
    Ok(Some(items))
}

pub fn write_compact_array<T>(
    dst: &mut WriteCursor<'_>,
    value: Option<&[T]>,
    write_elem: impl Fn(&mut WriteCursor<'_>, &T) -> EncodeResult<()>,
) -> EncodeResult<()> {
    match value {
        None => dst.write_uvarint(0),
        Some(items) => {
            let len: u64 = cast_length!(CTX, "compact array length", items.len())?;
            dst.write_uvarint(len + 1)?;
            for item in items {
                write_elem(dst, item)?;
            }
            Ok(())
        }
    }
}

pub fn read_compact_array<T>(
    src: &mut ReadCursor<'_>,
    read_elem: impl Fn(&mut ReadCursor<'_>) -> DecodeResult<T>,
) -> DecodeResult<Option<Vec<T>>> {
    let raw = src.read_uvarint()?;
    if raw == 0 {
        return Ok(None);
    }
    let len = raw - 1;
    check_array_len(i32::try_from(len).unwrap_or(i32::MAX))?;
    let mut items = Vec::with_capacity((len as usize).min(4096));
    for _ in 0..len {
        items.push(read_elem(src)?);
    }
    Ok(Some(items))
}

pub fn write_string_array(dst: &mut WriteCursor<'_>, value: &[String]) -> EncodeResult<()> {
    write_array(dst, Some(value), |dst, s| write_string(dst, s))
}

pub fn read_string_array(src: &mut ReadCursor<'_>) -> DecodeResult<Vec<String>> {
    Ok(read_array(src, read_string)?.unwrap_or_default())
}

use crate::traits::WithSource as _;

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip<T: PartialEq + std::fmt::Debug>(
        write: impl FnOnce(&mut WriteCursor<'_>) -> EncodeResult<()>,
        read: impl FnOnce(&mut ReadCursor<'_>) -> DecodeResult<T>,
        expected: T,
    ) {
        let mut buf = vec![0u8; 256];
        let written = {
            let mut w = WriteCursor::new(&mut buf);
            write(&mut w).unwrap();
            w.pos()
        };
        let mut r = ReadCursor::new(&buf[..written]);
        let got = read(&mut r).unwrap();
        assert_eq!(got, expected);
        assert!(r.eof());
    }

    #[test]
    fn string_round_trip() {
        roundtrip(|w| write_string(w, "hello"), read_string, "hello".to_owned());
    }

    #[test]
    fn nullable_string_null_and_present() {
        roundtrip(|w| write_nullable_string(w, None), read_nullable_string, None);
        roundtrip(
            |w| write_nullable_string(w, Some("x")),
            read_nullable_string,
            Some("x".to_owned()),
        );
    }

    #[test]
    fn compact_nullable_string_null_vs_empty() {
        roundtrip(|w| write_compact_nullable_string(w, None), read_compact_nullable_string, None);
        roundtrip(
            |w| write_compact_nullable_string(w, Some("")),
            read_compact_nullable_string,
            Some(String::new()),
        );
        roundtrip(
            |w| write_compact_nullable_string(w, Some("ab")),
            read_compact_nullable_string,
            Some("ab".to_owned()),
        );
    }

    #[test]
    fn compact_nullable_string_raw_zero_is_null_not_empty() {
        // Directly exercises the corrected decode behavior (spec §9 open question): a raw
        // uvarint of 0 must decode to `None`, not `Some("")`.
        let buf = [0u8];
        let mut r = ReadCursor::new(&buf);
        assert_eq!(read_compact_nullable_string(&mut r).unwrap(), None);
    }

    #[test]
    fn bytes_null_and_present() {
        roundtrip(|w| write_bytes(w, None), read_bytes, None);
        roundtrip(|w| write_bytes(w, Some(b"abc")), read_bytes, Some(b"abc".to_vec()));
    }

    #[test]
    fn array_null_vs_empty_are_distinct() {
        roundtrip(
            |w| write_array::<i32>(w, None, |dst, v| dst.write_i32_be(*v)),
            |src| read_array(src, |c| ReadCursor::read_i32_be(c)),
            None,
        );
        roundtrip(
            |w| write_array::<i32>(w, Some(&[]), |dst, v| dst.write_i32_be(*v)),
            |src| read_array(src, |c| ReadCursor::read_i32_be(c)),
            Some(Vec::new()),
        );
    }

    #[test]
    fn array_length_beyond_sanity_bound_is_rejected() {
        let mut buf = [0u8; 4];
        WriteCursor::new(&mut buf).write_i32_be(LENGTH_SANITY_BOUND + 1).unwrap();
        let mut r = ReadCursor::new(&buf);
        let result: DecodeResult<Option<Vec<i32>>> =
            read_array(&mut r, |c| ReadCursor::read_i32_be(c));
        assert!(result.is_err());
    }
}
