//! Consumer-Metadata (key 10): a legacy alias over [`find_coordinator`] (spec §4.6, §9
//! "Legacy aliases").
//!
//! Grounded on `original_source/consumer_metadata_request.go` /
//! `consumer_metadata_response.go`: these never run their own wire logic, they construct a
//! `FindCoordinatorRequest`/delegate to `FindCoordinatorResponse::decode` and re-project the
//! result onto deprecated scalar fields. Implemented here as adapters, not a parallel codec
//! path, per spec §9.

use super::find_coordinator::{BrokerDescriptor, CoordinatorType, FindCoordinatorRequest, FindCoordinatorResponse};
use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::version::BrokerVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerMetadataRequest {
    pub version: i16,
    pub consumer_group: String,
}

impl ConsumerMetadataRequest {
    fn as_find_coordinator(&self) -> FindCoordinatorRequest {
        FindCoordinatorRequest {
            version: self.version,
            coordinator_key: self.consumer_group.clone(),
            coordinator_type: CoordinatorType::Group,
        }
    }
}

impl Encode for ConsumerMetadataRequest {
    fn name(&self) -> &'static str {
        "ConsumerMetadataRequest"
    }

    fn size(&self) -> usize {
        self.as_find_coordinator().size()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        self.as_find_coordinator().encode(dst)
    }
}

impl<'de> Decode<'de> for ConsumerMetadataRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let inner = FindCoordinatorRequest::decode(src, version)?;
        Ok(Self {
            version,
            consumer_group: inner.coordinator_key,
        })
    }
}

impl ProtocolBody for ConsumerMetadataRequest {
    fn api_key(&self) -> i16 {
        10
    }

    fn api_version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        1
    }

    fn is_valid_version(&self) -> bool {
        (0..=2).contains(&self.version)
    }

    fn required_broker_version(&self) -> BrokerVersion {
        match self.version {
            2 => BrokerVersion::V2_0_0_0,
            1 => BrokerVersion::V0_11_0_0,
            _ => BrokerVersion::V0_10_0_0,
        }
    }
}

/// Deprecated scalar fields are populated from the parsed broker after decode so observers
/// that never learned about the richer descriptor keep working.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConsumerMetadataResponse {
    pub version: i16,
    pub err: i16,
    pub coordinator: Option<BrokerDescriptor>,
    pub coordinator_id: i32,
    pub coordinator_host: String,
    pub coordinator_port: i32,
}

impl Encode for ConsumerMetadataResponse {
    fn name(&self) -> &'static str {
        "ConsumerMetadataResponse"
    }

    fn size(&self) -> usize {
        self.as_find_coordinator().size()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        self.as_find_coordinator().encode(dst)
    }
}

impl ConsumerMetadataResponse {
    fn as_find_coordinator(&self) -> FindCoordinatorResponse {
        FindCoordinatorResponse {
            version: self.version,
            throttle_time_ms: 0,
            err: self.err,
            err_msg: None,
            coordinator: self.coordinator.clone(),
        }
    }
}

impl<'de> Decode<'de> for ConsumerMetadataResponse {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let inner = FindCoordinatorResponse::decode(src, version)?;
        let (coordinator_id, coordinator_host, coordinator_port) = match &inner.coordinator {
            Some(broker) => (broker.node_id, broker.host.clone(), broker.port),
            None => (-1, String::new(), -1),
        };
        Ok(Self {
            version,
            err: inner.err,
            coordinator: inner.coordinator,
            coordinator_id,
            coordinator_host,
            coordinator_port,
        })
    }
}

impl ProtocolBody for ConsumerMetadataResponse {
    fn api_key(&self) -> i16 {
        10
    }

    fn api_version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        0
    }

    fn is_valid_version(&self) -> bool {
        (0..=2).contains(&self.version)
    }

    fn required_broker_version(&self) -> BrokerVersion {
        match self.version {
            2 => BrokerVersion::V2_0_0_0,
            1 => BrokerVersion::V0_11_0_0,
            _ => BrokerVersion::V0_10_0_0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_round_trips_through_find_coordinator_wire_shape() {
        let request = ConsumerMetadataRequest {
            version: 1,
            consumer_group: "my-group".to_owned(),
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = ConsumerMetadataRequest::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded, request);
    }

    #[test]
    fn response_backfills_deprecated_scalar_fields() {
        let response = ConsumerMetadataResponse {
            version: 1,
            err: 0,
            coordinator: Some(BrokerDescriptor {
                node_id: 3,
                host: "h".to_owned(),
                port: 9092,
            }),
            coordinator_id: 0,
            coordinator_host: String::new(),
            coordinator_port: 0,
        };
        let mut buf = vec![0u8; response.size()];
        response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        let decoded = ConsumerMetadataResponse::decode(&mut ReadCursor::new(&buf), 1).unwrap();
        assert_eq!(decoded.coordinator_id, 3);
        assert_eq!(decoded.coordinator_host, "h");
        assert_eq!(decoded.coordinator_port, 9092);
    }
}
