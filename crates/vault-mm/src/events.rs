//! Quote notifications for the indexing sink.
//!
//! One event per ladder slot touched by a refresh, in refresh order.
//! Payloads are derived only from block inputs, so every node emits the
//! same stream.

use serde::{Deserialize, Serialize};
use vault_core::{Order, OrderId, OrderSide, VaultId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum QuoteEvent {
    /// A slot was re-quoted. `replaced_order_id` is the previous block's
    /// identifier for the slot, whether or not it was still resting.
    Replaced {
        vault_id: VaultId,
        layer: u8,
        side: OrderSide,
        replaced_order_id: OrderId,
        order: Order,
    },
    /// A resting quote was cancelled with nothing placed in its slot.
    Removed {
        vault_id: VaultId,
        layer: u8,
        side: OrderSide,
        order_id: OrderId,
    },
}

impl QuoteEvent {
    pub fn vault_id(&self) -> VaultId {
        match self {
            Self::Replaced { vault_id, .. } | Self::Removed { vault_id, .. } => *vault_id,
        }
    }
}
