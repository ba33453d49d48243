//! Find-Coordinator (key 10), versions 0–2 (spec §4.6).
//!
//! Grounded on `original_source/find_coordinator_request.go` / `find_coordinator_response.go`.
//! The response's trailing broker descriptor is always decoded without a rack field, even
//! though a general broker decoder elsewhere in the source supports one — this response
//! hardcodes the no-rack shape regardless of version.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::shapes;
use crate::version::BrokerVersion;

const REQUEST_NAME: &str = "FindCoordinatorRequest";
const RESPONSE_NAME: &str = "FindCoordinatorResponse";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i8)]
pub enum CoordinatorType {
    Group = 0,
    Transaction = 1,
}

impl CoordinatorType {
    fn from_i8(value: i8) -> Self {
        if value == 1 {
            Self::Transaction
        } else {
            Self::Group
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindCoordinatorRequest {
    pub version: i16,
    pub coordinator_key: String,
    pub coordinator_type: CoordinatorType,
}

impl Encode for FindCoordinatorRequest {
    fn name(&self) -> &'static str {
        REQUEST_NAME
    }

    fn size(&self) -> usize {
        let mut size = 2 + self.coordinator_key.len();
        if self.version >= 1 {
            size += 1;
        }
        size
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.coordinator_key)?;
        if self.version >= 1 {
            dst.write_i8(self.coordinator_type as i8)?;
        }
        Ok(())
    }
}

impl<'de> Decode<'de> for FindCoordinatorRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let coordinator_key = shapes::read_string(src)?;
        let coordinator_type = if version >= 1 {
            CoordinatorType::from_i8(src.read_i8()?)
        } else {
            CoordinatorType::Group
        };
        Ok(Self {
            version,
            coordinator_key,
            coordinator_type,
        })
    }
}

impl ProtocolBody for FindCoordinatorRequest {
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

/// Node id / host / port only; FindCoordinator never decodes a rack for its broker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerDescriptor {
    pub node_id: i32,
    pub host: String,
    pub port: i32,
}

impl BrokerDescriptor {
    fn size(&self) -> usize {
        4 + 2 + self.host.len() + 4
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i32_be(self.node_id)?;
        shapes::write_string(dst, &self.host)?;
        dst.write_i32_be(self.port)
    }

    fn decode(src: &mut ReadCursor<'_>) -> DecodeResult<Self> {
        let node_id = src.read_i32_be()?;
        let host = shapes::read_string(src)?;
        let port = src.read_i32_be()?;
        Ok(Self { node_id, host, port })
    }

    fn absent() -> Self {
        Self {
            node_id: -1,
            host: String::new(),
            port: -1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FindCoordinatorResponse {
    pub version: i16,
    pub throttle_time_ms: i32,
    pub err: i16,
    pub err_msg: Option<String>,
    pub coordinator: Option<BrokerDescriptor>,
}

impl Encode for FindCoordinatorResponse {
    fn name(&self) -> &'static str {
        RESPONSE_NAME
    }

    fn size(&self) -> usize {
        let mut size = 2;
        if self.version >= 1 {
            size += 4;
            size += 2 + self.err_msg.as_deref().unwrap_or_default().len();
        }
        size += match &self.coordinator {
            Some(broker) => broker.size(),
            None => BrokerDescriptor::absent().size(),
        };
        size
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        if self.version >= 1 {
            dst.write_i32_be(self.throttle_time_ms)?;
        }
        dst.write_i16_be(self.err)?;
        if self.version >= 1 {
            shapes::write_nullable_string(dst, self.err_msg.as_deref())?;
        }
        match &self.coordinator {
            Some(broker) => broker.encode(dst),
            None => BrokerDescriptor::absent().encode(dst),
        }
    }
}

impl<'de> Decode<'de> for FindCoordinatorResponse {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let throttle_time_ms = if version >= 1 { src.read_i32_be()? } else { 0 };
        let err = src.read_i16_be()?;
        let err_msg = if version >= 1 { shapes::read_nullable_string(src)? } else { None };
        let broker = BrokerDescriptor::decode(src)?;
        let coordinator = if broker == BrokerDescriptor::absent() { None } else { Some(broker) };
        Ok(Self {
            version,
            throttle_time_ms,
            err,
            err_msg,
            coordinator,
        })
    }
}

impl ProtocolBody for FindCoordinatorResponse {
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
    use crate::encode;

    #[test]
    fn v1_request_matches_seed_scenario_bytes() {
        let request = FindCoordinatorRequest {
            version: 1,
            coordinator_key: "group-1".to_owned(),
            coordinator_type: CoordinatorType::Group,
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        assert_eq!(buf, [0x00, 0x07, b'g', b'r', b'o', b'u', b'p', b'-', b'1', 0x00]);
    }

    #[test]
    fn request_round_trips_at_every_version() {
        for version in 0..=2 {
            let request = FindCoordinatorRequest {
                version,
                coordinator_key: "grp".to_owned(),
                coordinator_type: CoordinatorType::Transaction,
            };
            let mut buf = vec![0u8; request.size()];
            encode::encode(&request, &mut buf).unwrap();
            let decoded = FindCoordinatorRequest::decode(&mut ReadCursor::new(&buf), version).unwrap();
            let expected_type = if version >= 1 { CoordinatorType::Transaction } else { CoordinatorType::Group };
            assert_eq!(decoded.coordinator_type, expected_type);
        }
    }

    #[test]
    fn response_round_trips_with_and_without_coordinator() {
        for version in 0..=2 {
            let response = FindCoordinatorResponse {
                version,
                throttle_time_ms: 5,
                err: 0,
                err_msg: None,
                coordinator: Some(BrokerDescriptor {
                    node_id: 1,
                    host: "broker1".to_owned(),
                    port: 9092,
                }),
            };
            let mut buf = vec![0u8; response.size()];
            response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
            let decoded = FindCoordinatorResponse::decode(&mut ReadCursor::new(&buf), version).unwrap();
            assert_eq!(decoded.coordinator, response.coordinator);
            if version >= 1 {
                assert_eq!(decoded.throttle_time_ms, 5);
            }

            let absent = FindCoordinatorResponse {
                coordinator: None,
                ..response
            };
            let mut buf = vec![0u8; absent.size()];
            absent.encode(&mut WriteCursor::new(&mut buf)).unwrap();
            let decoded = FindCoordinatorResponse::decode(&mut ReadCursor::new(&buf), version).unwrap();
            assert_eq!(decoded.coordinator, None);
        }
    }
}
