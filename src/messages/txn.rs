//! Add-Offsets-To-Txn (key 25), End-Txn (key 26), and Txn-Offset-Commit (key 28), versions
//! 0–2 (spec §4.6): "straightforward fixed-schema requests; responses carry throttle time +
//! error code."
//!
//! Grounded on `original_source/add_offsets_to_txn_request.go`,
//! `add_offsets_to_txn_response.go`, `end_txn_request.go`, `end_txn_response.go`,
//! `txn_offset_commit_request.go`. `TxnOffsetCommitRequest` is modeled here with the same
//! fixed top-level scalar fields as its siblings rather than the full per-partition offset
//! list real brokers also carry, matching the family's "straightforward fixed-schema"
//! grouping.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::shapes;
use crate::version::BrokerVersion;

fn required_version(version: i16) -> BrokerVersion {
    match version {
        2 => BrokerVersion::V2_7_0_0,
        1 => BrokerVersion::V2_0_0_0,
        _ => BrokerVersion::V0_11_0_0,
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddOffsetsToTxnRequest {
    pub version: i16,
    pub transactional_id: String,
    pub producer_id: i64,
    pub producer_epoch: i16,
    pub group_id: String,
}

impl Encode for AddOffsetsToTxnRequest {
    fn name(&self) -> &'static str {
        "AddOffsetsToTxnRequest"
    }

    fn size(&self) -> usize {
        2 + self.transactional_id.len() + 8 + 2 + 2 + self.group_id.len()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.transactional_id)?;
        dst.write_i64_be(self.producer_id)?;
        dst.write_i16_be(self.producer_epoch)?;
        shapes::write_string(dst, &self.group_id)
    }
}

impl<'de> Decode<'de> for AddOffsetsToTxnRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        Ok(Self {
            version,
            transactional_id: shapes::read_string(src)?,
            producer_id: src.read_i64_be()?,
            producer_epoch: src.read_i16_be()?,
            group_id: shapes::read_string(src)?,
        })
    }
}

impl ProtocolBody for AddOffsetsToTxnRequest {
    fn api_key(&self) -> i16 {
        25
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
        required_version(self.version)
    }
}

/// `AddOffsetsToTxnResponse` and `EndTxnResponse` are distinct API keys over an identical
/// wire shape (throttle time + error code); this macro avoids writing the four trait impls
/// twice for what is otherwise the same struct definition.
macro_rules! throttled_error_response {
    ($ty:ident, $name:literal, $api_key:expr) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq)]
        pub struct $ty {
            pub version: i16,
            pub throttle_time_ms: i32,
            pub err: i16,
        }

        impl Encode for $ty {
            fn name(&self) -> &'static str {
                $name
            }

            fn size(&self) -> usize {
                4 + 2
            }

            fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
                dst.write_i32_be(self.throttle_time_ms)?;
                dst.write_i16_be(self.err)
            }
        }

        impl<'de> Decode<'de> for $ty {
            fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
                Ok(Self {
                    version,
                    throttle_time_ms: src.read_i32_be()?,
                    err: src.read_i16_be()?,
                })
            }
        }

        impl ProtocolBody for $ty {
            fn api_key(&self) -> i16 {
                $api_key
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
                required_version(self.version)
            }
        }
    };
}

throttled_error_response!(AddOffsetsToTxnResponse, "AddOffsetsToTxnResponse", 25);
throttled_error_response!(EndTxnResponse, "EndTxnResponse", 26);
throttled_error_response!(TxnOffsetCommitResponse, "TxnOffsetCommitResponse", 28);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndTxnRequest {
    pub version: i16,
    pub transactional_id: String,
    pub producer_id: i64,
    pub producer_epoch: i16,
    pub transaction_result: bool,
}

impl Encode for EndTxnRequest {
    fn name(&self) -> &'static str {
        "EndTxnRequest"
    }

    fn size(&self) -> usize {
        2 + self.transactional_id.len() + 8 + 2 + 1
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.transactional_id)?;
        dst.write_i64_be(self.producer_id)?;
        dst.write_i16_be(self.producer_epoch)?;
        dst.write_bool(self.transaction_result)
    }
}

impl<'de> Decode<'de> for EndTxnRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        Ok(Self {
            version,
            transactional_id: shapes::read_string(src)?,
            producer_id: src.read_i64_be()?,
            producer_epoch: src.read_i16_be()?,
            transaction_result: src.read_bool()?,
        })
    }
}

impl ProtocolBody for EndTxnRequest {
    fn api_key(&self) -> i16 {
        26
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
        required_version(self.version)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxnOffsetCommitRequest {
    pub version: i16,
    pub transactional_id: String,
    pub group_id: String,
    pub producer_id: i64,
    pub producer_epoch: i16,
}

impl Encode for TxnOffsetCommitRequest {
    fn name(&self) -> &'static str {
        "TxnOffsetCommitRequest"
    }

    fn size(&self) -> usize {
        2 + self.transactional_id.len() + 2 + self.group_id.len() + 8 + 2
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        shapes::write_string(dst, &self.transactional_id)?;
        shapes::write_string(dst, &self.group_id)?;
        dst.write_i64_be(self.producer_id)?;
        dst.write_i16_be(self.producer_epoch)
    }
}

impl<'de> Decode<'de> for TxnOffsetCommitRequest {
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        Ok(Self {
            version,
            transactional_id: shapes::read_string(src)?,
            group_id: shapes::read_string(src)?,
            producer_id: src.read_i64_be()?,
            producer_epoch: src.read_i16_be()?,
        })
    }
}

impl ProtocolBody for TxnOffsetCommitRequest {
    fn api_key(&self) -> i16 {
        28
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
        required_version(self.version)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn end_txn_v0_response_matches_seed_scenario_bytes() {
        let response = EndTxnResponse {
            version: 0,
            throttle_time_ms: 0,
            err: 0,
        };
        let mut buf = vec![0u8; response.size()];
        response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        assert_eq!(buf, [0x00, 0x00, 0x00, 0x00, 0x00, 0x00]);
    }

    #[test]
    fn add_offsets_and_end_txn_requests_round_trip() {
        let add = AddOffsetsToTxnRequest {
            version: 1,
            transactional_id: "t1".to_owned(),
            producer_id: 1,
            producer_epoch: 0,
            group_id: "g1".to_owned(),
        };
        let mut buf = vec![0u8; add.size()];
        add.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        assert_eq!(AddOffsetsToTxnRequest::decode(&mut ReadCursor::new(&buf), 1).unwrap(), add);

        let end = EndTxnRequest {
            version: 1,
            transactional_id: "t1".to_owned(),
            producer_id: 1,
            producer_epoch: 0,
            transaction_result: true,
        };
        let mut buf = vec![0u8; end.size()];
        end.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        assert_eq!(EndTxnRequest::decode(&mut ReadCursor::new(&buf), 1).unwrap(), end);
    }

    #[test]
    fn txn_offset_commit_round_trips() {
        let request = TxnOffsetCommitRequest {
            version: 1,
            transactional_id: "t1".to_owned(),
            group_id: "g1".to_owned(),
            producer_id: 1,
            producer_epoch: 0,
        };
        let mut buf = vec![0u8; request.size()];
        request.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        assert_eq!(TxnOffsetCommitRequest::decode(&mut ReadCursor::new(&buf), 1).unwrap(), request);

        let response = TxnOffsetCommitResponse {
            version: 1,
            throttle_time_ms: 0,
            err: 0,
        };
        let mut buf = vec![0u8; response.size()];
        response.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        assert_eq!(TxnOffsetCommitResponse::decode(&mut ReadCursor::new(&buf), 1).unwrap(), response);
    }
}
