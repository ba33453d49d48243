//! ACL messages (keys 29–31), versions 0–1 (spec §4.6).
//!
//! Grounded on `original_source/acl_bindings.go` (`Resource`, `Acl`, `ResourceAcls`),
//! `acl_describe_request.go` / `acl_describe_response.go`, `acl_delete_request.go`,
//! `acl_create_request.go` / `acl_create_response.go`. Unknown resource pattern types are
//! normalized to `Literal` on encode with a warning, matching the source's long-established
//! (if not strictly faithful) behavior (spec §9 "Normalization on encode").

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::macros::cast_length;
use crate::registry::ProtocolBody;
use crate::shapes;
use crate::version::BrokerVersion;

fn required_version(version: i16) -> BrokerVersion {
    if version >= 1 {
        BrokerVersion::V2_0_0_0
    } else {
        BrokerVersion::V0_11_0_0
    }
}

const PATTERN_LITERAL: i8 = 3;

/// A resource a binding or filter applies to. `pattern_type` is only present on the wire at
/// version 1.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    pub resource_type: i8,
    pub resource_name: String,
    pub resource_pattern_type: i8,
}

impl Resource {
    fn size(&self, version: i16) -> usize {
        1 + 2 + self.resource_name.len() + if version == 1 { 1 } else { 0 }
    }

    fn encode(&self, dst: &mut WriteCursor<'_>, version: i16) -> EncodeResult<()> {
        dst.write_i8(self.resource_type)?;
        shapes::write_string(dst, &self.resource_name)?;
        if version == 1 {
            let pattern = if self.resource_pattern_type == 0 {
                tracing::warn!("cannot encode an unknown resource pattern type, using Literal instead");
                PATTERN_LITERAL
            } else {
                self.resource_pattern_type
            };
            dst.write_i8(pattern)?;
        }
        Ok(())
    }

    fn decode(src: &mut ReadCursor<'_>, version: i16) -> DecodeResult<Self> {
        let resource_type = src.read_i8()?;
        let resource_name = shapes::read_string(src)?;
        let resource_pattern_type = if version == 1 { src.read_i8()? } else { 0 };
        Ok(Self {
            resource_type,
            resource_name,
            resource_pattern_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Acl {
    pub principal: String,
    pub host: String,
    pub operation: i8,
    pub permission_type: i8,
}

impl Acl {
    fn size(&self) -> usize {
        2 + self.principal.len() + 2 + self.host.len() + 1 + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.principal)?;
        shapes::write_string(dst, &self.host)?;
        dst.write_i8(self.operation)?;
        dst.write_i8(self.permission_type)
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        Ok(Self {
            principal: shapes::read_string(src)?,
            host: shapes::read_string(src)?,
            operation: src.read_i8()?,
            permission_type: src.read_i8()?,
        })
    }
}

/// A resource paired with the ACLs bound to it, as returned by `DescribeAcls` responses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceAcls {
    pub resource: Resource,
    pub acls: Vec<Acl>,
}

impl ResourceAcls {
    fn size(&self, version: i16) -> usize {
        self.resource.size(version) + 4 + self.acls.iter().map(Acl::size).sum::<usize>()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>, version: i16) -> EncodeResult<()> {
        self.resource.encode(dst, version)?;
        shapes::write_array(dst, Some(&self.acls), |dst, acl| acl.encode(dst))
    }

    fn decode(src: &mut ReadCursor<'_>, version: i16) -> DecodeResult<Self> {
        let resource = Resource::decode(src, version)?;
        let acls = shapes::read_array(src, Acl::decode)?.unwrap_or_default();
        Ok(Self { resource, acls })
    }
}

/// An ACL-creation entry: a `Resource` and the single `Acl` to bind to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclCreation {
    pub resource: Resource,
    pub acl: Acl,
}

impl AclCreation {
    fn size(&self, version: i16) -> usize {
        self.resource.size(version) + self.acl.size()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>, version: i16) -> EncodeResult<()> {
        self.resource.encode(dst, version)?;
        self.acl.encode(dst)
    }

    fn decode(src: &mut ReadCursor<'_>, version: i16) -> DecodeResult<Self> {
        Ok(Self {
            resource: Resource::decode(src, version)?,
            acl: Acl::decode(src)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclCreationResponse {
    pub err: i16,
    pub err_msg: Option<String>,
}

impl AclCreationResponse {
    fn size(&self) -> usize {
        2 + 2 + self.err_msg.as_deref().unwrap_or_default().len()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i16_be(self.err)?;
        shapes::write_nullable_string(dst, self.err_msg.as_deref())
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        Ok(Self {
            err: src.read_i16_be()?,
            err_msg: shapes::read_nullable_string(src)?,
        })
    }
}

/// A filter over resources; extends `Resource` with nullable counterparts so an absent field
/// means "match anything" (spec §4.6: "a `Filter` extends these with nullable counterparts").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AclFilter {
    pub resource_type: i8,
    pub resource_name: Option<String>,
    pub resource_pattern_type: i8,
    pub principal: Option<String>,
    pub host: Option<String>,
    pub operation: i8,
    pub permission_type: i8,
}

impl AclFilter {
    fn size(&self, version: i16) -> usize {
        1 + 2
            + self.resource_name.as_deref().unwrap_or_default().len()
            + if version == 1 { 1 } else { 0 }
            + 2
            + self.principal.as_deref().unwrap_or_default().len()
            + 2
            + self.host.as_deref().unwrap_or_default().len()
            + 1
            + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>, version: i16) -> EncodeResult<()> {
        dst.write_i8(self.resource_type)?;
        shapes::write_nullable_string(dst, self.resource_name.as_deref())?;
        if version == 1 {
            dst.write_i8(self.resource_pattern_type)?;
        }
        shapes::write_nullable_string(dst, self.principal.as_deref())?;
        shapes::write_nullable_string(dst, self.host.as_deref())?;
        dst.write_i8(self.operation)?;
        dst.write_i8(self.permission_type)
    }

    fn decode(src: &mut ReadCursor<'_>, version: i16) -> DecodeResult<Self> {
        let resource_type = src.read_i8()?;
        let resource_name = shapes::read_nullable_string(src)?;
        let resource_pattern_type = if version == 1 { src.read_i8()? } else { 0 };
        let principal = shapes::read_nullable_string(src)?;
        let host = shapes::read_nullable_string(src)?;
        let operation = src.read_i8()?;
        let permission_type = src.read_i8()?;
        Ok(Self {
            resource_type,
            resource_name,
            resource_pattern_type,
            principal,
            host,
            operation,
            permission_type,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeAclsRequest {
    pub version: i16,
    pub filter: AclFilter,
}

impl Encode for DescribeAclsRequest {
    fn name(&self) -> &'static str {
        "DescribeAclsRequest"
    }
    fn size(&self) -> usize {
        self.filter.size(self.version)
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        self.filter.encode(dst, self.version)
    }
}

impl<'de> Decode<'de> for DescribeAclsRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        Ok(Self {
            version,
            filter: AclFilter::decode(src, version)?,
        })
    }
}

impl ProtocolBody for DescribeAclsRequest {
    fn api_key(&self) -> i16 {
        29
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
        required_version(self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DescribeAclsResponse {
    pub version: i16,
    pub throttle_time_ms: i32,
    pub error_code: i16,
    pub error_message: Option<String>,
    pub resources: Vec<ResourceAcls>,
}

impl Encode for DescribeAclsResponse {
    fn name(&self) -> &'static str {
        "DescribeAclsResponse"
    }
    fn size(&self) -> usize {
        4 + 2
            + 2
            + self.error_message.as_deref().unwrap_or_default().len()
            + 4
            + self.resources.iter().map(|r| r.size(self.version)).sum::<usize>()
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i32_be(self.throttle_time_ms)?;
        dst.write_i16_be(self.error_code)?;
        shapes::write_nullable_string(dst, self.error_message.as_deref())?;
        let version = self.version;
        shapes::write_array(dst, Some(&self.resources), |dst, r| r.encode(dst, version))
    }
}

impl<'de> Decode<'de> for DescribeAclsResponse {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let throttle_time_ms = src.read_i32_be()?;
        let error_code = src.read_i16_be()?;
        let error_message = shapes::read_nullable_string(src)?;
        let resources = shapes::read_array(src, |src| ResourceAcls::decode(src, version))?.unwrap_or_default();
        Ok(Self {
            version,
            throttle_time_ms,
            error_code,
            error_message,
            resources,
        })
    }
}

impl ProtocolBody for DescribeAclsResponse {
    fn api_key(&self) -> i16 {
        29
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
        required_version(self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteAclsRequest {
    pub version: i16,
    pub filters: Vec<AclFilter>,
}

impl Encode for DeleteAclsRequest {
    fn name(&self) -> &'static str {
        "DeleteAclsRequest"
    }
    fn size(&self) -> usize {
        4 + self.filters.iter().map(|f| f.size(self.version)).sum::<usize>()
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        let version = self.version;
        shapes::write_array(dst, Some(&self.filters), |dst, f| f.encode(dst, version))
    }
}

impl<'de> Decode<'de> for DeleteAclsRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let filters = shapes::read_array(src, |src| AclFilter::decode(src, version))?.unwrap_or_default();
        Ok(Self { version, filters })
    }
}

impl ProtocolBody for DeleteAclsRequest {
    fn api_key(&self) -> i16 {
        31
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
        required_version(self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAclsRequest {
    pub version: i16,
    pub creations: Vec<AclCreation>,
}

impl Encode for CreateAclsRequest {
    fn name(&self) -> &'static str {
        "CreateAclsRequest"
    }
    fn size(&self) -> usize {
        4 + self.creations.iter().map(|c| c.size(self.version)).sum::<usize>()
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        let version = self.version;
        shapes::write_array(dst, Some(&self.creations), |dst, c| c.encode(dst, version))
    }
}

impl<'de> Decode<'de> for CreateAclsRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let creations = shapes::read_array(src, |src| AclCreation::decode(src, version))?.unwrap_or_default();
        Ok(Self { version, creations })
    }
}

impl ProtocolBody for CreateAclsRequest {
    fn api_key(&self) -> i16 {
        30
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
        required_version(self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateAclsResponse {
    pub version: i16,
    pub throttle_time_ms: i32,
    pub responses: Vec<AclCreationResponse>,
}

impl Encode for CreateAclsResponse {
    fn name(&self) -> &'static str {
        "CreateAclsResponse"
    }
    fn size(&self) -> usize {
        4 + 4 + self.responses.iter().map(AclCreationResponse::size).sum::<usize>()
    }
    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i32_be(self.throttle_time_ms)?;
        shapes::write_array(dst, Some(&self.responses), |dst, r| r.encode(dst))
    }
}

impl<'de> Decode<'de> for CreateAclsResponse {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let throttle_time_ms = src.read_i32_be()?;
        let responses = shapes::read_array(src, |src| AclCreationResponse::decode(src))?.unwrap_or_default();
        Ok(Self {
            version,
            throttle_time_ms,
            responses,
        })
    }
}

impl ProtocolBody for CreateAclsResponse {
    fn api_key(&self) -> i16 {
        30
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
        required_version(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_resource(pattern: i8) -> Resource {
        Resource {
            resource_type: 2,
            resource_name: "topic-1".to_owned(),
            resource_pattern_type: pattern,
        }
    }

    #[test]
    fn unknown_pattern_type_normalizes_to_literal_on_encode() {
        let resource = sample_resource(0);
        let mut buf = vec![0u8; resource.size(1)];
        resource.encode(&mut WriteCursor::new(&mut buf), 1).unwrap();
        let decoded = Resource::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded.resource_pattern_type, PATTERN_LITERAL);
    }

    #[test]
    fn v0_resource_has_no_pattern_type_on_the_wire() {
        let resource = sample_resource(3);
        assert_eq!(resource.size(0), 1 + 2 + 7);
    }

    #[test]
    fn create_acls_round_trips() {
        let request = CreateAclsRequest {
            version: 1,
            creations: vec![AclCreation {
                resource: sample_resource(3),
                acl: Acl {
                    principal: "User:alice".to_owned(),
                    host: "*".to_owned(),
                    operation: 3,
                    permission_type: 3,
                },
            }],
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = CreateAclsRequest::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn describe_acls_response_round_trips() {
        let response = DescribeAclsResponse {
            version: 1,
            throttle_time_ms: 0,
            error_code: 0,
            error_message: None,
            resources: vec![ResourceAcls {
                resource: sample_resource(3),
                acls: vec![Acl {
                    principal: "User:alice".to_owned(),
                    host: "*".to_owned(),
                    operation: 3,
                    permission_type: 3,
                }],
            }],
        };
        let mut buf = vec![0u8; response.size()];
        response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = DescribeAclsResponse::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded, response);
    }

    #[test]
    fn delete_acls_filter_list_round_trips() {
        let request = DeleteAclsRequest {
            version: 0,
            filters: vec![AclFilter {
                resource_type: 2,
                resource_name: None,
                resource_pattern_type: 0,
                principal: Some("User:bob".to_owned()),
                host: None,
                operation: 2,
                permission_type: 2,
            }],
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = DeleteAclsRequest::decode(&mut ReadCursor::new(&buf), 0).unwrap();
        assert_eq!(decoded, request);
    }
}
