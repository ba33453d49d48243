//! Alter-Client-Quotas (key 49), version 0 only (spec §4.6).
//!
//! Grounded on `original_source/alter_client_quotas_request.go`: entity components, ops, and
//! the enclosing entries are always encoded as present arrays — the source never emits a
//! null array for any of the three, even for an entry with zero ops, so decode normalizes a
//! wire-null back to empty rather than treating it as a distinct state.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::shapes;
use crate::version::BrokerVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuotaEntityComponent {
    pub entity_type: String,
    pub entity_name: Option<String>,
}

impl QuotaEntityComponent {
    fn size(&self) -> usize {
        2 + self.entity_type.len() + 2 + self.entity_name.as_deref().unwrap_or_default().len()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.entity_type)?;
        shapes::write_nullable_string(dst, self.entity_name.as_deref())
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        Ok(Self {
            entity_type: shapes::read_string(src)?,
            entity_name: shapes::read_nullable_string(src)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterClientQuotasEntry {
    pub entity: Vec<QuotaEntityComponent>,
    pub ops: Vec<ClientQuotaOp>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ClientQuotaOp {
    pub key: String,
    pub value: f64,
    pub remove: bool,
}

impl ClientQuotaOp {
    fn size(&self) -> usize {
        2 + self.key.len() + 8 + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.key)?;
        dst.write_f64_be(self.value)?;
        dst.write_bool(self.remove)
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        Ok(Self {
            key: shapes::read_string(src)?,
            value: src.read_f64_be()?,
            remove: src.read_bool()?,
        })
    }
}

impl AlterClientQuotasEntry {
    fn size(&self) -> usize {
        4 + self.entity.iter().map(QuotaEntityComponent::size).sum::<usize>()
            + 4
            + self.ops.iter().map(ClientQuotaOp::size).sum::<usize>()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_array(dst, Some(&self.entity), |dst, e| e.encode(dst))?;
        shapes::write_array(dst, Some(&self.ops), |dst, o| o.encode(dst))
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let entity = shapes::read_array(src, QuotaEntityComponent::decode)?.unwrap_or_default();
        let ops = shapes::read_array(src, ClientQuotaOp::decode)?.unwrap_or_default();
        Ok(Self { entity, ops })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlterClientQuotasRequest {
    pub entries: Vec<AlterClientQuotasEntry>,
    pub validate_only: bool,
}

impl Encode for AlterClientQuotasRequest {
    fn name(&self) -> &'static str {
        "AlterClientQuotasRequest"
    }

    fn size(&self) -> usize {
        4 + self.entries.iter().map(AlterClientQuotasEntry::size).sum::<usize>() + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_array(dst, Some(&self.entries), |dst, e| e.encode(dst))?;
        dst.write_bool(self.validate_only)
    }
}

impl<'de> Decode<'de> for AlterClientQuotasRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        if version != 0 {
            return Err(crate::traits::unsupported_version_err("AlterClientQuotasRequest", version));
        }
        let entries = shapes::read_array(src, AlterClientQuotasEntry::decode)?.unwrap_or_default();
        let validate_only = src.read_bool()?;
        Ok(Self { entries, validate_only })
    }
}

impl ProtocolBody for AlterClientQuotasRequest {
    fn api_key(&self) -> i16 {
        49
    }
    fn api_version(&self) -> i16 {
        0
    }
    fn header_version(&self) -> i16 {
        1
    }
    fn is_valid_version(&self) -> bool {
        true
    }
    fn required_broker_version(&self) -> BrokerVersion {
        BrokerVersion::V2_6_0_0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_with_one_op_round_trips() {
        let request = AlterClientQuotasRequest {
            entries: vec![AlterClientQuotasEntry {
                entity: vec![QuotaEntityComponent {
                    entity_type: "user".to_owned(),
                    entity_name: Some("alice".to_owned()),
                }],
                ops: vec![ClientQuotaOp {
                    key: "producer_byte_rate".to_owned(),
                    value: 1024.0,
                    remove: false,
                }],
            }],
            validate_only: false,
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = AlterClientQuotasRequest::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn empty_ops_and_entity_still_round_trip_as_present_arrays() {
        let request = AlterClientQuotasRequest {
            entries: vec![AlterClientQuotasEntry {
                entity: Vec::new(),
                ops: Vec::new(),
            }],
            validate_only: true,
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = AlterClientQuotasRequest::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded, request);
    }
}
