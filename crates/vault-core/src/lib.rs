//! Core domain types for vault quoting.
//!
//! This crate provides the building blocks shared by the pricing and
//! refresh engine:
//! - `Ratio`: exact signed rational arithmetic with explicit rounding
//! - `VaultId`, `SubaccountId`: vault and order-owner identity
//! - `OraclePrice`, `MarketParam`, `ClobPairConfig`: price and order-book units
//! - `OrderSide`, `OrderId`, `Order`: long-term order descriptors
//! - `BlockContext`: height and time of the block being executed

pub mod block;
pub mod error;
pub mod fixed;
pub mod market;
pub mod order;
pub mod vault;

pub use block::BlockContext;
pub use error::{CoreError, Result};
pub use fixed::{Ratio, Rounding};
pub use market::{ClobPairConfig, MarketParam, OraclePrice, QUOTE_ATOMIC_RESOLUTION};
pub use order::{CancelRequest, Order, OrderFlags, OrderId, OrderSide, SubaccountId};
pub use vault::{VaultId, VaultType};
