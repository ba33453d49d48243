//! Minimum broker releases a message version requires (spec §3: "a declaration of the
//! minimum broker release required"), supplemented from each request's `RequiredVersion()`
//! in `original_source/*.go`.

/// A broker release, `major.minor.patch`. The fourth "build" component Sarama's
/// `KafkaVersion` carries is always zero for every version this crate names, so it is
/// dropped here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct BrokerVersion(pub u8, pub u8, pub u8);

impl BrokerVersion {
    pub const V0_10_0_0: Self = Self(0, 10, 0);
    pub const V0_11_0_0: Self = Self(0, 11, 0);
    pub const V1_0_0_0: Self = Self(1, 0, 0);
    pub const V2_0_0_0: Self = Self(2, 0, 0);
    pub const V2_2_0_0: Self = Self(2, 2, 0);
    pub const V2_3_0_0: Self = Self(2, 3, 0);
    pub const V2_6_0_0: Self = Self(2, 6, 0);
    pub const V2_7_0_0: Self = Self(2, 7, 0);
}

impl std::fmt::Display for BrokerVersion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}.{}.{}", self.0, self.1, self.2)
    }
}
