//! Fallback body for catalogued API keys that are not modeled field-by-field (spec §4.6:
//! "representative families... non-exhaustive"; spec §6 still requires every catalogued key
//! to dispatch to *something*). An [`Opaque`] body carries its payload as an undissected byte
//! blob and round-trips it unchanged.

use crate::cursor::{ReadCursor, WriteCursor};
use crate::decode::{Decode, DecodeResult};
use crate::encode::{Encode, EncodeResult};
use crate::registry::ProtocolBody;
use crate::version::BrokerVersion;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Opaque {
    pub api_key: i16,
    pub api_version: i16,
    /// Whether this key uses a flexible (tagged-field-bearing) header at this version; the
    /// registry's catalogue supplies this since an undissected payload can't tell on its own.
    pub header_version: i16,
    pub payload: Vec<u8>,
}

impl Encode for Opaque {
    fn name(&self) -> &'static str {
        "Opaque"
    }

    fn size(&self) -> usize {
        self.payload.len()
    }

    fn encode(&self, dst: &mut WriteCursor<'_>) -> EncodeResult<()> {
        dst.write_slice(&self.payload)
    }
}

impl<'de> Decode<'de> for Opaque {
    /// Never called directly (the registry supplies `api_key`/`header_version` out of band
    /// since they aren't recoverable from the payload alone); present only to satisfy
    /// [`Decode`] uniformly across message bodies.
    fn decode(src: &mut ReadCursor<'de>, version: i16) -> DecodeResult<Self> {
        let payload = src.read_slice(src.len())?.to_vec();
        Ok(Self {
            api_key: -1,
            api_version: version,
            header_version: 0,
            payload,
        })
    }
}

impl ProtocolBody for Opaque {
    fn api_key(&self) -> i16 {
        self.api_key
    }

    fn api_version(&self) -> i16 {
        self.api_version
    }

    fn header_version(&self) -> i16 {
        self.header_version
    }

    fn is_valid_version(&self) -> bool {
        true
    }

    fn required_broker_version(&self) -> BrokerVersion {
        BrokerVersion::V0_10_0_0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payload_round_trips_unchanged() {
        let opaque = Opaque {
            api_key: 0,
            api_version: 7,
            header_version: 2,
            payload: vec![1, 2, 3, 4],
        };
        let mut buf = vec![0u8; opaque.size()];
        opaque.encode(&mut WriteCursor::new(&mut buf)).unwrap();
        assert_eq!(buf, opaque.payload);
    }
}
