//! Request/response envelope framing (spec §3, §6): the frame length prefix, the fixed
//! api-key/api-version/correlation-id fields, and the header-version-gated client id and
//! tagged-field array.
//!
//! Grounded on `original_source/request.go`'s `Request.Encode`/`Decode` and
//! `original_source/response_header.go`'s `Response.Encode`/`Decode`.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::DecodeResult;
use crate::encode::EncodeResult;
use crate::shapes;
use crate::tagged;

/// Header version 0 is response-only (no client id, no tagged fields); 1 is a legacy
/// request (client id, no tagged fields); 2 is a flexible request (client id and a tagged
/// field array), per spec §4.6.
pub const HEADER_V0: i16 = 0;
pub const HEADER_V1: i16 = 1;
pub const HEADER_V2: i16 = 2;

/// The fixed fields every request carries regardless of header version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestHeader {
    pub api_key: i16,
    pub api_version: i16,
    pub correlation_id: i32,
    /// Present when `header_version >= 1`.
    pub client_id: Option<String>,
}

impl RequestHeader {
    pub fn size(&self, header_version: i16) -> usize {
        let mut size = 2 + 2 + 4;
        if header_version >= HEADER_V1 {
            size += 2 + self.client_id.as_deref().unwrap_or_default().len();
        }
        if header_version >= HEADER_V2 {
            size += 1; // empty tagged-field array
        }
        size
    }

    pub fn encode(&self, dst: &mut WriteCursor<'_>, header_version: i16) -> EncodeResult<()> {
        dst.write_i16_be(self.api_key)?;
        dst.write_i16_be(self.api_version)?;
        dst.write_i32_be(self.correlation_id)?;
        if header_version >= HEADER_V1 {
            shapes::write_nullable_string(dst, self.client_id.as_deref())?;
        }
        if header_version >= HEADER_V2 {
            tagged::write_empty_tagged_fields(dst)?;
        }
        Ok(())
    }

    /// `header_version` is resolved by the caller (the registry) from the already-read
    /// `api_key`/`api_version` before this is invoked — see spec §9: header version is a
    /// property of the message body, not of the wire bytes alone.
    pub fn decode(src: &mut ReadCursor<'_>, api_key: i16, api_version: i16, header_version: i16) -> DecodeResult<Self> {
        let correlation_id = src.read_i32_be()?;
        let client_id = if header_version >= HEADER_V1 {
            shapes::read_nullable_string(src)?
        } else {
            None
        };
        if header_version >= HEADER_V2 {
            tagged::skip_tagged_fields(src)?;
        }
        Ok(Self {
            api_key,
            api_version,
            correlation_id,
            client_id,
        })
    }
}

/// The response envelope is just a correlation id plus, on flexible responses, a tagged
/// field array (spec §6). Whether a given response is flexible is *not* the same question
/// as whether its header version is nonzero — see spec §9's open question and
/// [`crate::registry::is_flexible_response`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResponseHeader {
    pub correlation_id: i32,
}

impl ResponseHeader {
    pub fn size(flexible: bool) -> usize {
        4 + usize::from(flexible)
    }

    pub fn encode(&self, dst: &mut WriteCursor<'_>, flexible: bool) -> EncodeResult<()> {
        dst.write_i32_be(self.correlation_id)?;
        if flexible {
            tagged::write_empty_tagged_fields(dst)?;
        }
        Ok(())
    }

    pub fn decode(src: &mut ReadCursor<'_>, flexible: bool) -> DecodeResult<Self> {
        let correlation_id = src.read_i32_be()?;
        if flexible {
            tagged::skip_tagged_fields(src)?;
        }
        Ok(Self { correlation_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn legacy_request_header_has_no_tagged_fields() {
        let header = RequestHeader {
            api_key: 10,
            api_version: 1,
            correlation_id: 42,
            client_id: Some("cid".to_owned()),
        };
        let mut buf = vec![0u8; header.size(HEADER_V1)];
        header.encode(&mut WriteCursor::new(&mut buf), HEADER_V1).unwrap();
        let mut src = ReadCursor::new(&buf);
        let api_key = src.read_i16_be().unwrap();
        let api_version = src.read_i16_be().unwrap();
        let decoded = RequestHeader::decode(&mut src, api_key, api_version, HEADER_V1).unwrap();
        assert_eq!(decoded, header);
        assert!(src.eof());
    }

    #[test]
    fn flexible_request_header_round_trips() {
        let header = RequestHeader {
            api_key: 50,
            api_version: 0,
            correlation_id: 7,
            client_id: None,
        };
        let mut buf = vec![0u8; header.size(HEADER_V2)];
        header.encode(&mut WriteCursor::new(&mut buf), HEADER_V2).unwrap();
        let mut src = ReadCursor::new(&buf);
        let api_key = src.read_i16_be().unwrap();
        let api_version = src.read_i16_be().unwrap();
        let decoded = RequestHeader::decode(&mut src, api_key, api_version, HEADER_V2).unwrap();
        assert_eq!(decoded, header);
        assert!(src.eof());
    }
}
