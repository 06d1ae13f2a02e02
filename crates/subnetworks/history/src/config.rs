use std::time::Duration;

use alloy_primitives::B256;
use portal_validation::constants::DEFAULT_PRE_MERGE_ACC_HASH;

/// Capacity of the queue of offered content awaiting validation.
pub const DEFAULT_CONTENT_QUEUE_SIZE: usize = 256;

pub const DEFAULT_HEARTBEAT_INTERVAL: Duration = Duration::from_secs(30);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryConfig {
    pub content_queue_size: usize,
    pub heartbeat_interval: Duration,
    /// Root the pre-merge accumulator loaded at startup must hash to.
    pub pre_merge_acc_root: B256,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            content_queue_size: DEFAULT_CONTENT_QUEUE_SIZE,
            heartbeat_interval: DEFAULT_HEARTBEAT_INTERVAL,
            pre_merge_acc_root: DEFAULT_PRE_MERGE_ACC_HASH,
        }
    }
}
