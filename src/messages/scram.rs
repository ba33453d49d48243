//! Describe/Alter-User-Scram-Credentials (keys 50–51), version 0 only, flexible headers
//! (spec §4.6).
//!
//! Grounded on `original_source/describe_user_scram_credentials_request.go` (compact array of
//! user names, normalizing a compact-array "null" back to empty — the source never actually
//! emits null here) and `alter_user_scram_credentials_response.go` (throttle time plus a
//! compact array of per-user results). The request side of `AlterUserScramCredentials` was
//! not present in the retrieved source; it is inferred here from the response's symmetry —
//! deletions by name, upserts by name plus mechanism/iterations/salt/salted password.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::shapes;
use crate::tagged;
use crate::version::BrokerVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScramUserName {
    pub name: String,
}

impl ScramUserName {
    fn size(&self) -> usize {
        crate::uvarint_size(self.name.len() as u64 + 1) + self.name.len() + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_compact_string(dst, &self.name)?;
        tagged::write_empty_tagged_fields(dst)
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let name = shapes::read_compact_string(src)?;
        tagged::skip_tagged_fields(src)?;
        Ok(Self { name })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeUserScramCredentialsRequest {
    pub users: Vec<ScramUserName>,
}

impl Encode for DescribeUserScramCredentialsRequest {
    fn name(&self) -> &'static str {
        "DescribeUserScramCredentialsRequest"
    }

    fn size(&self) -> usize {
        let mut size: usize = crate::uvarint_size(self.users.len() as u64 + 1);
        size += self.users.iter().map(ScramUserName::size).sum::<usize>();
        size + 1 // trailing empty tagged fields
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_compact_array(dst, Some(&self.users), |dst, u| u.encode(dst))?;
        tagged::write_empty_tagged_fields(dst)
    }
}

impl<'de> Decode<'de> for DescribeUserScramCredentialsRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        if version != 0 {
            return Err(crate::traits::unsupported_version_err(
                "DescribeUserScramCredentialsRequest",
                version,
            ));
        }
        // A raw compact-array length of zero is read as `None` here; the source never emits
        // it, so it is normalized back to an empty user list rather than a distinct state.
        let users = shapes::read_compact_array(src, ScramUserName::decode)?.unwrap_or_default();
        tagged::skip_tagged_fields(src)?;
        Ok(Self { users })
    }
}

impl ProtocolBody for DescribeUserScramCredentialsRequest {
    fn api_key(&self) -> i16 {
        50
    }
    fn api_version(&self) -> i16 {
        0
    }
    fn header_version(&self) -> i16 {
        2
    }
    fn is_valid_version(&self) -> bool {
        true
    }
    fn required_broker_version(&self) -> BrokerVersion {
        BrokerVersion::V2_7_0_0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScramCredentialUpsertion {
    pub name: String,
    pub mechanism: i8,
    pub iterations: i32,
    pub salt: Vec<u8>,
    pub salted_password: Vec<u8>,
}

impl ScramCredentialUpsertion {
    fn size(&self) -> usize {
        crate::uvarint_size(self.name.len() as u64 + 1)
            + self.name.len()
            + 1
            + 4
            + crate::uvarint_size(self.salt.len() as u64 + 1)
            + self.salt.len()
            + crate::uvarint_size(self.salted_password.len() as u64 + 1)
            + self.salted_password.len()
            + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_compact_string(dst, &self.name)?;
        dst.write_i8(self.mechanism)?;
        dst.write_i32_be(self.iterations)?;
        shapes::write_compact_bytes(dst, Some(&self.salt))?;
        shapes::write_compact_bytes(dst, Some(&self.salted_password))?;
        tagged::write_empty_tagged_fields(dst)
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let name = shapes::read_compact_string(src)?;
        let mechanism = src.read_i8()?;
        let iterations = src.read_i32_be()?;
        let salt = shapes::read_compact_bytes(src)?.unwrap_or_default();
        let salted_password = shapes::read_compact_bytes(src)?.unwrap_or_default();
        tagged::skip_tagged_fields(src)?;
        Ok(Self {
            name,
            mechanism,
            iterations,
            salt,
            salted_password,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScramCredentialDeletion {
    pub name: String,
    pub mechanism: i8,
}

impl ScramCredentialDeletion {
    fn size(&self) -> usize {
        crate::uvarint_size(self.name.len() as u64 + 1) + self.name.len() + 1 + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_compact_string(dst, &self.name)?;
        dst.write_i8(self.mechanism)?;
        tagged::write_empty_tagged_fields(dst)
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let name = shapes::read_compact_string(src)?;
        let mechanism = src.read_i8()?;
        tagged::skip_tagged_fields(src)?;
        Ok(Self { name, mechanism })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterUserScramCredentialsRequest {
    pub deletions: Vec<ScramCredentialDeletion>,
    pub upsertions: Vec<ScramCredentialUpsertion>,
}

impl Encode for AlterUserScramCredentialsRequest {
    fn name(&self) -> &'static str {
        "AlterUserScramCredentialsRequest"
    }

    fn size(&self) -> usize {
        let mut size = crate::uvarint_size(self.deletions.len() as u64 + 1);
        size += self.deletions.iter().map(ScramCredentialDeletion::size).sum::<usize>();
        size += crate::uvarint_size(self.upsertions.len() as u64 + 1);
        size += self.upsertions.iter().map(ScramCredentialUpsertion::size).sum::<usize>();
        size + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_compact_array(dst, Some(&self.deletions), |dst, d| d.encode(dst))?;
        shapes::write_compact_array(dst, Some(&self.upsertions), |dst, u| u.encode(dst))?;
        tagged::write_empty_tagged_fields(dst)
    }
}

impl<'de> Decode<'de> for AlterUserScramCredentialsRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        if version != 0 {
            return Err(crate::traits::unsupported_version_err(
                "AlterUserScramCredentialsRequest",
                version,
            ));
        }
        let deletions = shapes::read_compact_array(src, ScramCredentialDeletion::decode)?.unwrap_or_default();
        let upsertions = shapes::read_compact_array(src, ScramCredentialUpsertion::decode)?.unwrap_or_default();
        tagged::skip_tagged_fields(src)?;
        Ok(Self { deletions, upsertions })
    }
}

impl ProtocolBody for AlterUserScramCredentialsRequest {
    fn api_key(&self) -> i16 {
        51
    }
    fn api_version(&self) -> i16 {
        0
    }
    fn header_version(&self) -> i16 {
        2
    }
    fn is_valid_version(&self) -> bool {
        true
    }
    fn required_broker_version(&self) -> BrokerVersion {
        BrokerVersion::V2_7_0_0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScramUserResult {
    pub user: String,
    pub error_code: i16,
    pub error_message: Option<String>,
}

impl ScramUserResult {
    fn size(&self) -> usize {
        crate::uvarint_size(self.user.len() as u64 + 1)
            + self.user.len()
            + 2
            + match &self.error_message {
                Some(m) => crate::uvarint_size(m.len() as u64 + 1) + m.len(),
                None => 1,
            }
            + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_compact_string(dst, &self.user)?;
        dst.write_i16_be(self.error_code)?;
        shapes::write_compact_nullable_string(dst, self.error_message.as_deref())?;
        tagged::write_empty_tagged_fields(dst)
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let user = shapes::read_compact_string(src)?;
        let error_code = src.read_i16_be()?;
        let error_message = shapes::read_compact_nullable_string(src)?;
        tagged::skip_tagged_fields(src)?;
        Ok(Self {
            user,
            error_code,
            error_message,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterUserScramCredentialsResponse {
    pub throttle_time_ms: i32,
    pub results: Vec<ScramUserResult>,
}

impl Encode for AlterUserScramCredentialsResponse {
    fn name(&self) -> &'static str {
        "AlterUserScramCredentialsResponse"
    }

    fn size(&self) -> usize {
        4 + crate::uvarint_size(self.results.len() as u64 + 1)
            + self.results.iter().map(ScramUserResult::size).sum::<usize>()
            + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i32_be(self.throttle_time_ms)?;
        shapes::write_compact_array(dst, Some(&self.results), |dst, r| r.encode(dst))?;
        tagged::write_empty_tagged_fields(dst)
    }
}

impl<'de> Decode<'de> for AlterUserScramCredentialsResponse {
    fn decode(src: &mut ReadCursor<'de>, _version: i16) -> DecodeResult<Self> {
        let throttle_time_ms = src.read_i32_be()?;
        let results = shapes::read_compact_array(src, ScramUserResult::decode)?.unwrap_or_default();
        tagged::skip_tagged_fields(src)?;
        Ok(Self {
            throttle_time_ms,
            results,
        })
    }
}

impl ProtocolBody for AlterUserScramCredentialsResponse {
    fn api_key(&self) -> i16 {
        51
    }
    fn api_version(&self) -> i16 {
        0
    }
    fn header_version(&self) -> i16 {
        2
    }
    fn is_valid_version(&self) -> bool {
        true
    }
    fn required_broker_version(&self) -> BrokerVersion {
        BrokerVersion::V2_7_0_0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn describe_request_round_trips_and_empty_list_normalizes() {
        let request = DescribeUserScramCredentialsRequest {
            users: vec![ScramUserName { name: "alice".to_owned() }],
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = DescribeUserScramCredentialsRequest::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded, request);

        let empty = DescribeUserScramCredentialsRequest { users: Vec::new() };
        let mut buf = vec![0u8; empty.size()];
        empty.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = DescribeUserScramCredentialsRequest::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded.users, Vec::new());
    }

    #[test]
    fn alter_response_round_trips() {
        let response = AlterUserScramCredentialsResponse {
            throttle_time_ms: 0,
            results: vec![ScramUserResult {
                user: "alice".to_owned(),
                error_code: 0,
                error_message: None,
            }],
        };
        let mut buf = vec![0u8; response.size()];
        response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = AlterUserScramCredentialsResponse::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn alter_request_round_trips() {
        let request = AlterUserScramCredentialsRequest {
            deletions: vec![ScramCredentialDeletion {
                name: "bob".to_owned(),
                mechanism: 1,
            }],
            upsertions: vec![ScramCredentialUpsertion {
                name: "alice".to_owned(),
                mechanism: 1,
                iterations: 4096,
                salt: vec![1, 2, 3],
                salted_password: vec![4, 5, 6],
            }],
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = AlterUserScramCredentialsRequest::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded, request);
    }
}
