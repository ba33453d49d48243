//! SASL-Handshake (key 17) and SASL-Authenticate (key 36), versions 0–1 (spec §4.6).
//!
//! Grounded on `original_source/sasl_handshake_request.go` / `sasl_handshake_response.go`
//! (mechanism negotiation: request names one mechanism, response lists every mechanism the
//! broker supports) and `sasl_authenticate_request.go` (opaque raw bytes, `Bytes` shape, not
//! `VarintBytes`). `SaslAuthenticateResponse` was never read from the source; it is inferred
//! here from the request's symmetry and the usual error-code-plus-message response shape.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::shapes;
use crate::version::BrokerVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslHandshakeRequest {
    pub version: i16,
    pub mechanism: String,
}

impl Encode for SaslHandshakeRequest {
    fn name(&self) -> &'static str {
        "SaslHandshakeRequest"
    }
    fn size(&self) -> usize {
        2 + self.mechanism.len()
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.mechanism)
    }
}

impl<'de> Decode<'de> for SaslHandshakeRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        Ok(Self {
            version,
            mechanism: shapes::read_string(src)?,
        })
    }
}

impl ProtocolBody for SaslHandshakeRequest {
    fn api_key(&self) -> i16 {
        17
    }
    fn api_version(&self) -> i16 {
        self.version
    }
    fn header_version(&self) -> i16 {
        1
    }
    fn is_valid_version(&self) -> bool {
        (0..=1).contains(&self.version)
    }
    fn required_broker_version(&self) -> BrokerVersion {
        if self.version >= 1 {
            BrokerVersion::V1_0_0_0
        } else {
            BrokerVersion::V0_10_0_0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslHandshakeResponse {
    pub version: i16,
    pub err: i16,
    pub enabled_mechanisms: Vec<String>,
}

impl Encode for SaslHandshakeResponse {
    fn name(&self) -> &'static str {
        "SaslHandshakeResponse"
    }
    fn size(&self) -> usize {
        2 + 4 + self.enabled_mechanisms.iter().map(|m| 2 + m.len()).sum::<usize>()
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i16_be(self.err)?;
        shapes::write_string_array(dst, &self.enabled_mechanisms)
    }
}

impl<'de> Decode<'de> for SaslHandshakeResponse {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        Ok(Self {
            version,
            err: src.read_i16_be()?,
            enabled_mechanisms: shapes::read_string_array(src)?,
        })
    }
}

impl ProtocolBody for SaslHandshakeResponse {
    fn api_key(&self) -> i16 {
        17
    }
    fn api_version(&self) -> i16 {
        self.version
    }
    fn header_version(&self) -> i16 {
        0
    }
    fn is_valid_version(&self) -> bool {
        (0..=1).contains(&self.version)
    }
    fn required_broker_version(&self) -> BrokerVersion {
        if self.version >= 1 {
            BrokerVersion::V1_0_0_0
        } else {
            BrokerVersion::V0_10_0_0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslAuthenticateRequest {
    pub version: i16,
    pub sasl_auth_bytes: Option<Vec<u8>>,
}

impl Encode for SaslAuthenticateRequest {
    fn name(&self) -> &'static str {
        "SaslAuthenticateRequest"
    }
    fn size(&self) -> usize {
        4 + self.sasl_auth_bytes.as_deref().map_or(0, <[u8]>::len)
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_bytes(dst, self.sasl_auth_bytes.as_deref())
    }
}

impl<'de> Decode<'de> for SaslAuthenticateRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        Ok(Self {
            version,
            sasl_auth_bytes: shapes::read_bytes(src)?,
        })
    }
}

impl ProtocolBody for SaslAuthenticateRequest {
    fn api_key(&self) -> i16 {
        36
    }
    fn api_version(&self) -> i16 {
        self.version
    }
    fn header_version(&self) -> i16 {
        1
    }
    fn is_valid_version(&self) -> bool {
        (0..=1).contains(&self.version)
    }
    fn required_broker_version(&self) -> BrokerVersion {
        if self.version >= 1 {
            BrokerVersion::V2_2_0_0
        } else {
            BrokerVersion::V1_0_0_0
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaslAuthenticateResponse {
    pub version: i16,
    pub err: i16,
    pub err_msg: Option<String>,
    pub sasl_auth_bytes: Option<Vec<u8>>,
    pub session_lifetime_ms: i64,
}

impl Encode for SaslAuthenticateResponse {
    fn name(&self) -> &'static str {
        "SaslAuthenticateResponse"
    }
    fn size(&self) -> usize {
        2 + 2
            + self.err_msg.as_deref().unwrap_or_default().len()
            + 4
            + self.sasl_auth_bytes.as_deref().map_or(0, <[u8]>::len)
            + if self.version >= 1 { 8 } else { 0 }
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i16_be(self.err)?;
        shapes::write_nullable_string(dst, self.err_msg.as_deref())?;
        shapes::write_bytes(dst, self.sasl_auth_bytes.as_deref())?;
        if self.version >= 1 {
            dst.write_i64_be(self.session_lifetime_ms)?;
        }
        Ok(())
    }
}

impl<'de> Decode<'de> for SaslAuthenticateResponse {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let err = src.read_i16_be()?;
        let err_msg = shapes::read_nullable_string(src)?;
        let sasl_auth_bytes = shapes::read_bytes(src)?;
        let session_lifetime_ms = if version >= 1 { src.read_i64_be()? } else { 0 };
        Ok(Self {
            version,
            err,
            err_msg,
            sasl_auth_bytes,
            session_lifetime_ms,
        })
    }
}

impl ProtocolBody for SaslAuthenticateResponse {
    fn api_key(&self) -> i16 {
        36
    }
    fn api_version(&self) -> i16 {
        self.version
    }
    fn header_version(&self) -> i16 {
        0
    }
    fn is_valid_version(&self) -> bool {
        (0..=1).contains(&self.version)
    }
    fn required_broker_version(&self) -> BrokerVersion {
        if self.version >= 1 {
            BrokerVersion::V2_2_0_0
        } else {
            BrokerVersion::V1_0_0_0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn handshake_round_trips() {
        let request = SaslHandshakeRequest {
            version: 1,
            mechanism: "PLAIN".to_owned(),
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = SaslHandshakeRequest::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded, request);

        let response = SaslHandshakeResponse {
            version: 1,
            err: 0,
            enabled_mechanisms: vec!["PLAIN".to_owned(), "SCRAM-SHA-256".to_owned()],
        };
        let mut buf = vec![0u8; response.size()];
        response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = SaslHandshakeResponse::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn authenticate_round_trips_with_and_without_bytes() {
        let request = SaslAuthenticateRequest {
            version: 1,
            sasl_auth_bytes: Some(vec![1, 2, 3]),
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = SaslAuthenticateRequest::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded, request);

        let response = SaslAuthenticateResponse {
            version: 1,
            err: 0,
            err_msg: None,
            sasl_auth_bytes: None,
            session_lifetime_ms: 3_600_000,
        };
        let mut buf = vec![0u8; response.size()];
        response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = SaslAuthenticateResponse::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded, response);
    }
}
