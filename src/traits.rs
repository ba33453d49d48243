//! Constructor traits shared by [`crate::encode::EncodeError`] and
//! [`crate::decode::DecodeError`] so the `ensure_size!`/`cast_length!` macros in
//! [`crate::macros`] can build the right error type from context alone.

use crate::error::Source;

/// Adds a boxed source to an error, regardless of its `Kind`.
pub trait WithSource {
    #[must_use]
    fn with_source<E: Source>(self, source: E) -> Self;
}

/// The read or write demanded more bytes than the buffer had remaining.
pub trait NotEnoughBytesErr {
    fn not_enough_bytes(context: &'static str, received: usize, expected: usize) -> Self;
}

pub fn not_enough_bytes_err<T: NotEnoughBytesErr>(context: &'static str, received: usize, expected: usize) -> T {
    T::not_enough_bytes(context, received, expected)
}

/// A declared array/string/bytes length is negative (beyond the nullable sentinel) or exceeds
/// the sanity bound.
pub trait InvalidLengthErr {
    fn invalid_length(context: &'static str, field: &'static str, reason: &'static str) -> Self;
}

pub fn invalid_length_err<T: InvalidLengthErr>(context: &'static str, field: &'static str, reason: &'static str) -> T {
    T::invalid_length(context, field, reason)
}

/// A varint/uvarint consumed more than ten continuation bytes.
pub trait VarintOverflowErr {
    fn varint_overflow(context: &'static str) -> Self;
}

pub fn varint_overflow_err<T: VarintOverflowErr>(context: &'static str) -> T {
    T::varint_overflow(context)
}

/// A boolean byte was outside `{0, 1}`.
pub trait InvalidBoolErr {
    fn invalid_bool(context: &'static str, got: u8) -> Self;
}

pub fn invalid_bool_err<T: InvalidBoolErr>(context: &'static str, got: u8) -> T {
    T::invalid_bool(context, got)
}

/// A CRC mismatch, or a declared length inconsistent with the bytes actually consumed.
pub trait CorruptFrameErr {
    fn corrupt_frame(context: &'static str, reason: &'static str) -> Self;
}

pub fn corrupt_frame_err<T: CorruptFrameErr>(context: &'static str, reason: &'static str) -> T {
    T::corrupt_frame(context, reason)
}

/// No registry entry for the given API key.
pub trait UnknownRequestKeyErr {
    fn unknown_request_key(key: i16) -> Self;
}

pub fn unknown_request_key_err<T: UnknownRequestKeyErr>(key: i16) -> T {
    T::unknown_request_key(key)
}

/// An API version outside the message's supported range.
pub trait UnsupportedVersionErr {
    fn unsupported_version(context: &'static str, got: i16) -> Self;
}

pub fn unsupported_version_err<T: UnsupportedVersionErr>(context: &'static str, got: i16) -> T {
    T::unsupported_version(context, got)
}

/// Oversize frame, null in a non-nullable slot, or any other structural violation.
pub trait OtherErr {
    fn other(context: &'static str, description: &'static str) -> Self;
}

pub fn other_err<T: OtherErr>(context: &'static str, description: &'static str) -> T {
    T::other(context, description)
}
