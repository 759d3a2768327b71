//! Order-related types and identifiers.
//!
//! Provides order side, order identifiers and the long-term order
//! descriptor vaults rest on the book.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Order side: buy or sell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Buy => write!(f, "buy"),
            Self::Sell => write!(f, "sell"),
        }
    }
}

/// Owner of an order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct SubaccountId {
    pub owner: String,
    pub number: u32,
}

impl fmt::Display for SubaccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.owner, self.number)
    }
}

/// Order lifetime flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OrderFlags(pub u32);

impl OrderFlags {
    /// Stateful order that rests across blocks until cancelled or expired.
    pub const LONG_TERM: Self = Self(64);
}

/// Order identifier as seen by the order book.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct OrderId {
    pub subaccount_id: SubaccountId,
    pub client_id: u32,
    pub order_flags: OrderFlags,
    pub clob_pair_id: u32,
}

impl fmt::Display for OrderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}#{:#010x}@{}",
            self.subaccount_id, self.client_id, self.clob_pair_id
        )
    }
}

/// Resting limit order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub order_id: OrderId,
    pub side: OrderSide,
    /// Size in base quantums.
    pub quantums: u64,
    /// Price in subticks.
    pub subticks: u64,
    /// Unix seconds after which the book drops the order.
    pub good_til_block_time: u32,
}

/// Request to cancel a stateful order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CancelRequest {
    pub order_id: OrderId,
    pub good_til_block_time: u32,
}
