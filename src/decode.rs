//! The decode half of the codec kernel: a [`Decode`] trait plus the error kind
//! catalogue from spec §7 (insufficient data, invalid length, varint overflow, invalid
//! bool, corrupt frame, unknown request key).

use std::fmt;

use crate::cursor::ReadCursor;
use crate::error::Error;
use crate::traits::{
    CorruptFrameErr, InvalidBoolErr, InvalidLengthErr, NotEnoughBytesErr, OtherErr, UnknownRequestKeyErr,
    UnsupportedVersionErr, VarintOverflowErr, WithSource,
};

pub type DecodeResult<T> = Result<T, DecodeError>;
pub type DecodeError = Error<DecodeErrorKind>;

#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum DecodeErrorKind {
    NotEnoughBytes { received: usize, expected: usize },
    InvalidLength { field: &'static str, reason: &'static str },
    VarintOverflow,
    InvalidBool { got: u8 },
    CorruptFrame { reason: &'static str },
    UnknownRequestKey { key: i16 },
    UnsupportedVersion { got: i16 },
    Other { description: &'static str },
}

impl std::error::Error for DecodeErrorKind {}

impl fmt::Display for DecodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughBytes { received, expected } => write!(
                f,
                "insufficient data: received {received} bytes, expected {expected} bytes"
            ),
            Self::InvalidLength { field, reason } => write!(f, "invalid length for `{field}`: {reason}"),
            Self::VarintOverflow => write!(f, "varint overflow: more than ten continuation bytes"),
            Self::InvalidBool { got } => write!(f, "invalid bool byte ({got})"),
            Self::CorruptFrame { reason } => write!(f, "corrupt frame: {reason}"),
            Self::UnknownRequestKey { key } => write!(f, "unknown request key ({key})"),
            Self::UnsupportedVersion { got } => write!(f, "unsupported version ({got})"),
            Self::Other { description } => write!(f, "{description}"),
        }
    }
}

impl WithSource for DecodeError {
    fn with_source<E: crate::error::Source>(self, source: E) -> Self {
        Error::with_source(self, source)
    }
}

impl NotEnoughBytesErr for DecodeError {
    fn not_enough_bytes(context: &'static str, received: usize, expected: usize) -> Self {
        Self::new(context, DecodeErrorKind::NotEnoughBytes { received, expected })
    }
}

impl InvalidLengthErr for DecodeError {
    fn invalid_length(context: &'static str, field: &'static str, reason: &'static str) -> Self {
        Self::new(context, DecodeErrorKind::InvalidLength { field, reason })
    }
}

impl VarintOverflowErr for DecodeError {
    fn varint_overflow(context: &'static str) -> Self {
        Self::new(context, DecodeErrorKind::VarintOverflow)
    }
}

impl InvalidBoolErr for DecodeError {
    fn invalid_bool(context: &'static str, got: u8) -> Self {
        Self::new(context, DecodeErrorKind::InvalidBool { got })
    }
}

impl CorruptFrameErr for DecodeError {
    fn corrupt_frame(context: &'static str, reason: &'static str) -> Self {
        Self::new(context, DecodeErrorKind::CorruptFrame { reason })
    }
}

impl UnknownRequestKeyErr for DecodeError {
    fn unknown_request_key(key: i16) -> Self {
        Self::new("registry", DecodeErrorKind::UnknownRequestKey { key })
    }
}

impl UnsupportedVersionErr for DecodeError {
    fn unsupported_version(context: &'static str, got: i16) -> Self {
        Self::new(context, DecodeErrorKind::UnsupportedVersion { got })
    }
}

impl OtherErr for DecodeError {
    fn other(context: &'static str, description: &'static str) -> Self {
        Self::new(context, DecodeErrorKind::Other { description })
    }
}

/// A value that can be parsed from a byte stream for one particular API version.
///
/// Unlike `Encode`, decoding always needs the version up front (field presence is
/// version-gated), so it is a plain function argument rather than a second trait method.
pub trait Decode<'de>: Sized {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self>;
}

pub fn decode<'de, T>(src: &'de [u8], version: i16) -> DecodeResult<T>
where
    T: Decode<'de>,
{
    let mut cursor = ReadCursor::new(src);
    T::decode(&mut cursor, version)
}

pub fn decode_cursor<'de, T>(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<T>
where
    T: Decode<'de>,
{
    T::decode(src, version)
}
