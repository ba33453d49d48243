//! The two process-wide tunables named in spec §6 ("Configuration").

/// `max_request_size` and `max_response_size` bound frame lengths (spec §3, §6): a
/// declared frame length of `<= 4` or `> max` is rejected before any allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    pub max_request_size: i32,
    pub max_response_size: i32,
}

impl Default for Limits {
    /// Matches Sarama's historical defaults (100 MiB requests, unlimited-ish responses).
    fn default() -> Self {
        Self {
            max_request_size: 100 * 1024 * 1024,
            max_response_size: i32::MAX,
        }
    }
}
