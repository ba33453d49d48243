//! Init-Producer-Id (key 22), versions 0–4 (spec §4.6, S3).
//!
//! Grounded on `original_source/init_producer_id_request.go`: the transactional id switches
//! from `NullableString` to `CompactNullableString` at version 2, the producer id/epoch pair
//! only appears from version 3, and the trailing tagged-field array only appears from
//! version 2 — which is also exactly when the header itself becomes flexible.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::shapes;
use crate::tagged;
use crate::version::BrokerVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InitProducerIdRequest {
    pub version: i16,
    pub transactional_id: Option<String>,
    pub transaction_timeout_ms: i32,
    pub producer_id: i64,
    pub producer_epoch: i16,
}

impl Encode for InitProducerIdRequest {
    fn name(&self) -> &'static str {
        "InitProducerIdRequest"
    }

    fn size(&self) -> usize {
        let mut size = if self.version < 2 {
            2 + self.transactional_id.as_deref().unwrap_or_default().len()
        } else {
            let len = self.transactional_id.as_deref().map_or(0, str::len);
            crate::uvarint_size(len as u64 + 1)
        };
        size += 4;
        if self.version >= 3 {
            size += 8 + 2;
        }
        if self.version >= 2 {
            size += 1; // empty tagged-field array
        }
        size
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        if self.version < 2 {
            shapes::write_nullable_string(dst, self.transactional_id.as_deref())?;
        } else {
            shapes::write_compact_nullable_string(dst, self.transactional_id.as_deref())?;
        }
        dst.write_i32_be(self.transaction_timeout_ms)?;
        if self.version >= 3 {
            dst.write_i64_be(self.producer_id)?;
            dst.write_i16_be(self.producer_epoch)?;
        }
        if self.version >= 2 {
            tagged::write_empty_tagged_fields(dst)?;
        }
        Ok(())
    }
}

impl<'de> Decode<'de> for InitProducerIdRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let transactional_id = if version < 2 {
            shapes::read_nullable_string(src)?
        } else {
            shapes::read_compact_nullable_string(src)?
        };
        let transaction_timeout_ms = src.read_i32_be()?;
        let (producer_id, producer_epoch) = if version >= 3 {
            (src.read_i64_be()?, src.read_i16_be()?)
        } else {
            (-1, -1)
        };
        if version >= 2 {
            tagged::skip_tagged_fields(src)?;
        }
        Ok(Self {
            version,
            transactional_id,
            transaction_timeout_ms,
            producer_id,
            producer_epoch,
        })
    }
}

impl ProtocolBody for InitProducerIdRequest {
    fn api_key(&self) -> i16 {
        22
    }

    fn api_version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        if self.version >= 2 {
            2
        } else {
            1
        }
    }

    fn is_valid_version(&self) -> bool {
        (0..=4).contains(&self.version)
    }

    fn required_broker_version(&self) -> BrokerVersion {
        match self.version {
            4 => BrokerVersion::V2_7_0_0,
            3 => BrokerVersion::V2_7_0_0,
            2 => BrokerVersion::V2_3_0_0,
            1 => BrokerVersion::V2_0_0_0,
            _ => BrokerVersion::V0_11_0_0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InitProducerIdResponse {
    pub version: i16,
    pub throttle_time_ms: i32,
    pub err: i16,
    pub producer_id: i64,
    pub producer_epoch: i16,
}

impl Encode for InitProducerIdResponse {
    fn name(&self) -> &'static str {
        "InitProducerIdResponse"
    }

    fn size(&self) -> usize {
        let mut size = 4 + 2 + 8 + 2;
        if self.version >= 2 {
            size += 1;
        }
        size
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_i32_be(self.throttle_time_ms)?;
        dst.write_i16_be(self.err)?;
        dst.write_i64_be(self.producer_id)?;
        dst.write_i16_be(self.producer_epoch)?;
        if self.version >= 2 {
            tagged::write_empty_tagged_fields(dst)?;
        }
        Ok(())
    }
}

impl<'de> Decode<'de> for InitProducerIdResponse {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let throttle_time_ms = src.read_i32_be()?;
        let err = src.read_i16_be()?;
        let producer_id = src.read_i64_be()?;
        let producer_epoch = src.read_i16_be()?;
        if version >= 2 {
            tagged::skip_tagged_fields(src)?;
        }
        Ok(Self {
            version,
            throttle_time_ms,
            err,
            producer_id,
            producer_epoch,
        })
    }
}

impl ProtocolBody for InitProducerIdResponse {
    fn api_key(&self) -> i16 {
        22
    }

    fn api_version(&self) -> i16 {
        self.version
    }

    fn header_version(&self) -> i16 {
        0
    }

    fn is_valid_version(&self) -> bool {
        (0..=4).contains(&self.version)
    }

    fn required_broker_version(&self) -> BrokerVersion {
        match self.version {
            4 => BrokerVersion::V2_7_0_0,
            3 => BrokerVersion::V2_7_0_0,
            2 => BrokerVersion::V2_3_0_0,
            1 => BrokerVersion::V2_0_0_0,
            _ => BrokerVersion::V0_11_0_0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn v2_request_matches_seed_scenario_bytes() {
        let request = InitProducerIdRequest {
            version: 2,
            transactional_id: None,
            transaction_timeout_ms: 60_000,
            producer_id: -1,
            producer_epoch: -1,
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        assert_eq!(buf, [0x00, 0x00, 0x00, 0xea, 0x60, 0x00]);
    }

    #[test]
    fn response_round_trips_at_every_version() {
        for version in 0..=4 {
            let response = InitProducerIdResponse {
                version,
                throttle_time_ms: 0,
                err: 0,
                producer_id: 1000,
                producer_epoch: 0,
            };
            let mut buf = vec![0u8; response.size()];
            response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
            let decoded = InitProducerIdResponse::decode(&mut ReadCursor::new(&buf), version).unwrap();
            assert_eq!(decoded, response);
        }
    }

    #[test]
    fn round_trips_at_every_version() {
        for version in 0..=4 {
            let request = InitProducerIdRequest {
                version,
                transactional_id: Some("txn-1".to_owned()),
                transaction_timeout_ms: 30_000,
                producer_id: 7,
                producer_epoch: 2,
            };
            let mut buf = vec![0u8; request.size()];
            request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
            let decoded = InitProducerIdRequest::decode(&mut ReadCursor::new(&buf), version).unwrap();
            assert_eq!(decoded.transactional_id, request.transactional_id);
            if version >= 3 {
                assert_eq!(decoded.producer_id, 7);
                assert_eq!(decoded.producer_epoch, 2);
            } else {
                assert_eq!(decoded.producer_id, -1);
            }
        }
    }
}
