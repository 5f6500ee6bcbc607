use bmpsteg_frame::FrameConfig;

use crate::capacity::CapacityPolicy;
use crate::naming::NamingPolicy;

/// Settings shared by encode and decode sessions.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StegConfig {
    /// Field limits applied while reading and writing the hidden frame.
    pub frame: FrameConfig,
    /// Capacity formula checked before encoding.
    pub capacity_policy: CapacityPolicy,
    /// Default output naming.
    pub naming: NamingPolicy,
}

impl StegConfig {
    /// Replace the largest payload accepted by encode and decode.
    pub fn with_max_payload(mut self, max_payload_size: u64) -> Self {
        self.frame.max_payload_size = max_payload_size;
        self
    }

    /// Replace the capacity policy.
    pub fn with_capacity_policy(mut self, policy: CapacityPolicy) -> Self {
        self.capacity_policy = policy;
        self
    }
}
