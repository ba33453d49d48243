//! Alter-Configs (key 33) and Incremental-Alter-Configs (key 44), version 0 only (spec §4.6).
//!
//! Grounded on `original_source/alter_configs_request.go` / `alter_configs_response.go`:
//! each resource carries a deterministically key-sorted list of config entries so repeated
//! encodes of the same logical request produce identical bytes. `DescribeConfigs` (key 32)
//! has no counterpart here and is dispatched through [`crate::messages::opaque::Opaque`] —
//! recorded as a deliberate scope decision in `DESIGN.md`. `IncrementalAlterConfigsRequest`
//! was not present in the retrieved source; its per-entry `operation` byte is inferred from
//! the spec's description of the four incremental operations (set/delete/append/subtract).

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::shapes;
use crate::version::BrokerVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigEntry {
    pub name: String,
    pub value: Option<String>,
}

impl ConfigEntry {
    fn size(&self) -> usize {
        2 + self.name.len() + 2 + self.value.as_deref().unwrap_or_default().len()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.name)?;
        shapes::write_nullable_string(dst, self.value.as_deref())
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        Ok(Self {
            name: shapes::read_string(src)?,
            value: shapes::read_nullable_string(src)?,
        })
    }
}

/// A resource targeted by an `AlterConfigs` request. `config_entries` is kept sorted by
/// name so two calls building the same logical request encode identically.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterConfigsResource {
    pub resource_type: i8,
    pub resource_name: String,
    pub config_entries: Vec<ConfigEntry>,
}

impl AlterConfigsResource {
    fn sorted_entries(&self) -> Vec<&ConfigEntry> {
        let mut entries: Vec<&ConfigEntry> = self.config_entries.iter().collect();
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn size(&self) -> usize {
        1 + 2
            + self.resource_name.len()
            + 4
            + self.config_entries.iter().map(ConfigEntry::size).sum::<usize>()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i8(self.resource_type)?;
        shapes::write_string(dst, &self.resource_name)?;
        let entries = self.sorted_entries();
        shapes::write_array(dst, Some(&entries), |dst, e| e.encode(dst))
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let resource_type = src.read_i8()?;
        let resource_name = shapes::read_string(src)?;
        let config_entries = shapes::read_array(src, ConfigEntry::decode)?.unwrap_or_default();
        Ok(Self {
            resource_type,
            resource_name,
            config_entries,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterConfigsRequest {
    pub resources: Vec<AlterConfigsResource>,
    pub validate_only: bool,
}

impl Encode for AlterConfigsRequest {
    fn name(&self) -> &'static str {
        "AlterConfigsRequest"
    }

    fn size(&self) -> usize {
        4 + self.resources.iter().map(AlterConfigsResource::size).sum::<usize>() + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_array(dst, Some(&self.resources), |dst, r| r.encode(dst))?;
        dst.write_bool(self.validate_only)
    }
}

impl<'de> Decode<'de> for AlterConfigsRequest {
    fn decode(src: &mut ReadCursor<'de>, _version: i16) -> DecodeResult<Self> {
        let resources = shapes::read_array(src, AlterConfigsResource::decode)?.unwrap_or_default();
        let validate_only = src.read_bool()?;
        Ok(Self { resources, validate_only })
    }
}

impl ProtocolBody for AlterConfigsRequest {
    fn api_key(&self) -> i16 {
        33
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
        BrokerVersion::V0_11_0_0
    }
}

/// Per-resource result shared by `AlterConfigs` and `IncrementalAlterConfigs` responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterConfigsResourceResponse {
    pub error_code: i16,
    pub error_msg: String,
    pub resource_type: i8,
    pub resource_name: String,
}

impl AlterConfigsResourceResponse {
    fn size(&self) -> usize {
        2 + 2 + self.error_msg.len() + 1 + 2 + self.resource_name.len()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i16_be(self.error_code)?;
        shapes::write_string(dst, &self.error_msg)?;
        dst.write_i8(self.resource_type)?;
        shapes::write_string(dst, &self.resource_name)
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        Ok(Self {
            error_code: src.read_i16_be()?,
            error_msg: shapes::read_string(src)?,
            resource_type: src.read_i8()?,
            resource_name: shapes::read_string(src)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlterConfigsResponse {
    pub throttle_time_ms: i32,
    pub resources: Vec<AlterConfigsResourceResponse>,
}

impl Encode for AlterConfigsResponse {
    fn name(&self) -> &'static str {
        "AlterConfigsResponse"
    }

    fn size(&self) -> usize {
        4 + 4 + self.resources.iter().map(AlterConfigsResourceResponse::size).sum::<usize>()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i32_be(self.throttle_time_ms)?;
        shapes::write_array(dst, Some(&self.resources), |dst, r| r.encode(dst))
    }
}

impl<'de> Decode<'de> for AlterConfigsResponse {
    fn decode(src: &mut ReadCursor<'de>, _version: i16) -> DecodeResult<Self> {
        let throttle_time_ms = src.read_i32_be()?;
        let resources = shapes::read_array(src, AlterConfigsResourceResponse::decode)?.unwrap_or_default();
        Ok(Self {
            throttle_time_ms,
            resources,
        })
    }
}

impl ProtocolBody for AlterConfigsResponse {
    fn api_key(&self) -> i16 {
        33
    }
    fn api_version(&self) -> i16 {
        0
    }
    fn header_version(&self) -> i16 {
        0
    }
    fn is_valid_version(&self) -> bool {
        true
    }
    fn required_broker_version(&self) -> BrokerVersion {
        BrokerVersion::V0_11_0_0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum IncrementalAlterConfigsOp {
    Set = 0,
    Delete = 1,
    Append = 2,
    Subtract = 3,
}

impl IncrementalAlterConfigsOp {
    fn from_i8(value: i8) -> DecodeResult<Self> {
        match value {
            0 => Ok(Self::Set),
            1 => Ok(Self::Delete),
            2 => Ok(Self::Append),
            3 => Ok(Self::Subtract),
            _ => Err(crate::traits::invalid_length_err(
                "IncrementalAlterConfigsOp",
                "operation",
                "unknown operation code",
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalAlterConfigsEntry {
    pub name: String,
    pub op: IncrementalAlterConfigsOp,
    pub value: Option<String>,
}

impl IncrementalAlterConfigsEntry {
    fn size(&self) -> usize {
        2 + self.name.len() + 1 + 2 + self.value.as_deref().unwrap_or_default().len()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.name)?;
        dst.write_i8(self.op as i8)?;
        shapes::write_nullable_string(dst, self.value.as_deref())
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let name = shapes::read_string(src)?;
        let op = IncrementalAlterConfigsOp::from_i8(src.read_i8()?)?;
        let value = shapes::read_nullable_string(src)?;
        Ok(Self { name, op, value })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalAlterConfigsResource {
    pub resource_type: i8,
    pub resource_name: String,
    pub entries: Vec<IncrementalAlterConfigsEntry>,
}

impl IncrementalAlterConfigsResource {
    fn size(&self) -> usize {
        1 + 2 + self.resource_name.len() + 4 + self.entries.iter().map(IncrementalAlterConfigsEntry::size).sum::<usize>()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i8(self.resource_type)?;
        shapes::write_string(dst, &self.resource_name)?;
        shapes::write_array(dst, Some(&self.entries), |dst, e| e.encode(dst))
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let resource_type = src.read_i8()?;
        let resource_name = shapes::read_string(src)?;
        let entries = shapes::read_array(src, IncrementalAlterConfigsEntry::decode)?.unwrap_or_default();
        Ok(Self {
            resource_type,
            resource_name,
            entries,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncrementalAlterConfigsRequest {
    pub resources: Vec<IncrementalAlterConfigsResource>,
    pub validate_only: bool,
}

impl Encode for IncrementalAlterConfigsRequest {
    fn name(&self) -> &'static str {
        "IncrementalAlterConfigsRequest"
    }

    fn size(&self) -> usize {
        4 + self.resources.iter().map(IncrementalAlterConfigsResource::size).sum::<usize>() + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_array(dst, Some(&self.resources), |dst, r| r.encode(dst))?;
        dst.write_bool(self.validate_only)
    }
}

impl<'de> Decode<'de> for IncrementalAlterConfigsRequest {
    fn decode(src: &mut ReadCursor<'de>, _version: i16) -> DecodeResult<Self> {
        let resources = shapes::read_array(src, IncrementalAlterConfigsResource::decode)?.unwrap_or_default();
        let validate_only = src.read_bool()?;
        Ok(Self { resources, validate_only })
    }
}

impl ProtocolBody for IncrementalAlterConfigsRequest {
    fn api_key(&self) -> i16 {
        44
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
        BrokerVersion::V2_3_0_0
    }
}

/// `IncrementalAlterConfigsResponse` is a distinct api key over the same wire shape as
/// `AlterConfigsResponse`; reuses the macro pattern from `messages::txn` rather than
/// duplicating the four trait impls.
macro_rules! alter_configs_response {
    ($ty:ident, $name:literal, $api_key:expr, $required:expr) => {
        #[derive(Debug, Clone, PartialEq, Eq)]
        pub struct $ty {
            pub throttle_time_ms: i32,
            pub resources: Vec<AlterConfigsResourceResponse>,
        }

        impl Encode for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn size(&self) -> usize {
                4 + 4 + self.resources.iter().map(AlterConfigsResourceResponse::size).sum::<usize>()
            }

            fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
                dst.write_i32_be(self.throttle_time_ms)?;
                shapes::write_array(dst, Some(&self.resources), |dst, r| r.encode(dst))
            }
        }

        impl<'de> Decode<'de> for $ty {
            fn decode(src: &mut ReadCursor<'de>, _version: i16) -> DecodeResult<Self> {
                let throttle_time_ms = src.read_i32_be()?;
                let resources = shapes::read_array(src, AlterConfigsResourceResponse::decode)?.unwrap_or_default();
                Ok(Self {
                    throttle_time_ms,
                    resources,
                })
            }
        }

        impl ProtocolBody for $ty {
            fn api_key(&self) -> i16 {
                $api_key
            }
            fn api_version(&self) -> i16 {
                0
            }
            fn header_version(&self) -> i16 {
                0
            }
            fn is_valid_version(&self) -> bool {
                true
            }
            fn required_broker_version(&self) -> BrokerVersion {
                $required
            }
        }
    };
}

alter_configs_response!(
    IncrementalAlterConfigsResponse,
    "IncrementalAlterConfigsResponse",
    44,
    BrokerVersion::V2_3_0_0
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_entries_are_encoded_in_sorted_order() {
        let resource = AlterConfigsResource {
            resource_type: 2,
            resource_name: "topic-1".to_owned(),
            config_entries: vec![
                ConfigEntry {
                    name: "z".to_owned(),
                    value: Some("1".to_owned()),
                },
                ConfigEntry {
                    name: "a".to_owned(),
                    value: Some("2".to_owned()),
                },
            ],
        };
        let mut buf = vec![0u8; resource.size()];
        resource.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = AlterConfigsResource::decode(&mut ReadCursor::new(&buf)).unwrap();
        assert_eq!(decoded.config_entries[0].name, "a");
        assert_eq!(decoded.config_entries[1].name, "z");
    }

    #[test]
    fn alter_configs_request_round_trips() {
        let request = AlterConfigsRequest {
            resources: vec![AlterConfigsResource {
                resource_type: 2,
                resource_name: "topic-1".to_owned(),
                config_entries: vec![ConfigEntry {
                    name: "retention.ms".to_owned(),
                    value: Some("60000".to_owned()),
                }],
            }],
            validate_only: true,
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = AlterConfigsRequest::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn incremental_alter_configs_round_trips() {
        let request = IncrementalAlterConfigsRequest {
            resources: vec![IncrementalAlterConfigsResource {
                resource_type: 2,
                resource_name: "topic-1".to_owned(),
                entries: vec![IncrementalAlterConfigsEntry {
                    name: "retention.ms".to_owned(),
                    op: IncrementalAlterConfigsOp::Set,
                    value: Some("60000".to_owned()),
                }],
            }],
            validate_only: false,
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = IncrementalAlterConfigsRequest::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded, request);
    }
}
