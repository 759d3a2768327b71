//! Interfaces to the systems around the quoting engine.
//!
//! Each collaborator is a small trait so tests and the simulator can swap
//! in their own implementation. The engine keeps no state between blocks;
//! everything it needs is read through these traits.

use vault_core::{CancelRequest, ClobPairConfig, MarketParam, OraclePrice, Order, OrderId, VaultId};

use crate::error::MmResult;
use crate::events::QuoteEvent;
use crate::params::VaultParams;

/// Balances of one vault as reported by capital accounting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct VaultBalances {
    /// Quote asset held, in quote quantums (may be negative).
    pub quote_quantums: i128,
    /// Signed base inventory, in base quantums.
    pub inventory_base_quantums: i128,
    /// Outstanding vault shares.
    pub total_shares: u128,
}

/// Vault equity and inventory source.
#[cfg_attr(test, mockall::automock)]
pub trait CapitalAccounting {
    /// Configured vault set, in any order.
    fn vault_ids(&self) -> MmResult<Vec<VaultId>>;

    fn balances(&self, vault: &VaultId) -> MmResult<VaultBalances>;
}

/// Oracle prices and per-market parameters.
#[cfg_attr(test, mockall::automock)]
pub trait PriceOracle {
    fn market_price(&self, market_id: u32) -> MmResult<OraclePrice>;

    fn market_param(&self, market_id: u32) -> MmResult<MarketParam>;
}

/// Order-book pair configuration.
#[cfg_attr(test, mockall::automock)]
pub trait ClobPairSource {
    /// Fails with `MmError::ClobPairNotFound` when the pair does not exist.
    fn clob_pair(&self, id: u32) -> MmResult<ClobPairConfig>;
}

/// Stateful order book. Both mutations are synchronous and may fail.
#[cfg_attr(test, mockall::automock)]
pub trait OrderBook {
    /// Whether an order with this id currently rests on the book.
    fn has_order(&self, order_id: &OrderId) -> bool;

    fn cancel_stateful_order(&mut self, request: &CancelRequest) -> MmResult<()>;

    fn place_stateful_order(&mut self, order: &Order) -> MmResult<()>;
}

/// Governance parameter store.
#[cfg_attr(test, mockall::automock)]
pub trait ParamStore {
    fn params(&self) -> MmResult<VaultParams>;
}

/// Consumer of quote notifications (indexer, log, test collector).
pub trait EventSink {
    fn emit(&mut self, event: QuoteEvent);
}

impl EventSink for Vec<QuoteEvent> {
    fn emit(&mut self, event: QuoteEvent) {
        self.push(event);
    }
}

/// Read-only collaborators used to price a vault.
#[derive(Clone, Copy)]
pub struct Sources<'a> {
    pub capital: &'a dyn CapitalAccounting,
    pub oracle: &'a dyn PriceOracle,
    pub clob_pairs: &'a dyn ClobPairSource,
    pub params: &'a dyn ParamStore,
}
