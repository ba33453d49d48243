//! The encode half of the codec kernel: an [`Encode`] trait plus the two-pass
//! size-then-allocate-then-write free functions (spec §4.4).

use std::fmt;

use crate::cursor::WriteCursor;
use crate::error::Error;
use crate::limits::Limits;
use crate::traits::{InvalidLengthErr, NotEnoughBytesErr, OtherErr, UnsupportedVersionErr, WithSource};

pub type EncodeResult<T> = Result<T, EncodeError>;
pub type EncodeError = Error<EncodeErrorKind>;

#[non_exhaustive]
#[derive(Clone, Debug)]
pub enum EncodeErrorKind {
    NotEnoughBytes { received: usize, expected: usize },
    InvalidLength { field: &'static str, reason: &'static str },
    UnsupportedVersion { got: i16 },
    /// Oversize frame, null value in a non-nullable slot, or other structural violation.
    Other { description: &'static str },
}

impl std::error::Error for EncodeErrorKind {}

impl fmt::Display for EncodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotEnoughBytes { received, expected } => write!(
                f,
                "destination buffer too small: received {received} bytes, expected {expected} bytes"
            ),
            Self::InvalidLength { field, reason } => write!(f, "invalid length for `{field}`: {reason}"),
            Self::UnsupportedVersion { got } => write!(f, "unsupported version ({got})"),
            Self::Other { description } => write!(f, "{description}"),
        }
    }
}

impl WithSource for EncodeError {
    fn with_source<E: crate::error::Source>(self, source: E) -> Self {
        Error::with_source(self, source)
    }
}

impl NotEnoughBytesErr for EncodeError {
    fn not_enough_bytes(context: &'static str, received: usize, expected: usize) -> Self {
        Self::new(context, EncodeErrorKind::NotEnoughBytes { received, expected })
    }
}

impl InvalidLengthErr for EncodeError {
    fn invalid_length(context: &'static str, field: &'static str, reason: &'static str) -> Self {
        Self::new(context, EncodeErrorKind::InvalidLength { field, reason })
    }
}

impl UnsupportedVersionErr for EncodeError {
    fn unsupported_version(context: &'static str, got: i16) -> Self {
        Self::new(context, EncodeErrorKind::UnsupportedVersion { got })
    }
}

impl OtherErr for EncodeError {
    fn other(context: &'static str, description: &'static str) -> Self {
        Self::new(context, EncodeErrorKind::Other { description })
    }
}

/// A value that can be written out in its binary wire form.
///
/// `size()` must report exactly the number of bytes `encode()` writes; the two-pass
/// encoder in [`encode_vec`] relies on this (spec §4.4, §8 property 3).
pub trait Encode {
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()>;

    fn name(&self) -> &'static str;

    fn size(&self) -> usize;
}

crate::assert_obj_safe!(Encode);

/// Encodes `pdu` in-place into `dst`, returning the number of bytes written.
pub fn encode<T>(pdu: &T, dst: &mut [u8]) -> EncodeResult<usize>
where
    T: Encode + ?Sized,
{
    let mut cursor = WriteCursor::new(dst);
    pdu.encode(&mut cursor)?;
    Ok(cursor.pos())
}

/// Runs the sizing pass, checks it against `limits`, allocates exactly that many bytes, then
/// runs the writing pass. This is the two-pass encoder from spec §4.4.
pub fn encode_vec<T>(pdu: &T, limits: &Limits) -> EncodeResult<Vec<u8>>
where
    T: Encode + ?Sized,
{
    let pdu_size = pdu.size();
    if pdu_size > limits.max_request_size as usize {
        return Err(other_err(pdu.name(), "encoded message exceeds max_request_size"));
    }

    let mut buf = vec![0u8; pdu_size];
    let written = encode(pdu, buf.as_mut_slice())?;
    debug_assert_eq!(written, pdu_size, "sizing pass and writing pass disagree");
    Ok(buf)
}

fn other_err(context: &'static str, description: &'static str) -> EncodeError {
    crate::traits::other_err(context, description)
}
