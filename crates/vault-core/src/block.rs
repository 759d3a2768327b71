//! Block execution context.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Height and timestamp of the block being executed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockContext {
    /// Signed to match the chain's representation; negative heights are
    /// never produced but must still encode deterministically.
    pub height: i64,
    pub time: DateTime<Utc>,
}

impl BlockContext {
    pub fn new(height: i64, time: DateTime<Utc>) -> Self {
        Self { height, time }
    }

    /// The same block viewed at the previous height.
    pub fn previous(&self) -> Self {
        Self {
            height: self.height.wrapping_sub(1),
            time: self.time,
        }
    }

    /// Block time in unix seconds, clamped to `u32`.
    pub fn unix_seconds(&self) -> u32 {
        u32::try_from(self.time.timestamp().max(0)).unwrap_or(u32::MAX)
    }

    /// Good-til-block-time for an order placed in this block.
    pub fn good_til_block_time(&self, expiration_seconds: u32) -> u32 {
        self.unix_seconds().saturating_add(expiration_seconds)
    }
}
