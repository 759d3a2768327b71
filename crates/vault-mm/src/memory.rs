//! In-memory collaborators.
//!
//! Used by the simulator and by tests. Every map is ordered so iteration
//! is deterministic.

use std::collections::BTreeMap;

use vault_core::{CancelRequest, ClobPairConfig, MarketParam, OraclePrice, Order, OrderId, VaultId};

use crate::collaborators::{
    CapitalAccounting, ClobPairSource, OrderBook, ParamStore, PriceOracle, VaultBalances,
};
use crate::error::{MmError, MmResult};
use crate::params::VaultParams;

#[derive(Debug, Clone, Default)]
pub struct MemoryCapital {
    vaults: BTreeMap<VaultId, VaultBalances>,
}

impl MemoryCapital {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_balances(
        &mut self,
        vault: VaultId,
        quote_quantums: i128,
        inventory_base_quantums: i128,
        total_shares: u128,
    ) {
        self.vaults.insert(
            vault,
            VaultBalances {
                quote_quantums,
                inventory_base_quantums,
                total_shares,
            },
        );
    }
}

impl CapitalAccounting for MemoryCapital {
    fn vault_ids(&self) -> MmResult<Vec<VaultId>> {
        Ok(self.vaults.keys().copied().collect())
    }

    fn balances(&self, vault: &VaultId) -> MmResult<VaultBalances> {
        self.vaults
            .get(vault)
            .copied()
            .ok_or(MmError::VaultNotFound(*vault))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryOracle {
    prices: BTreeMap<u32, OraclePrice>,
    params: BTreeMap<u32, MarketParam>,
}

impl MemoryOracle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a market with its current price.
    pub fn set_market(&mut self, price: OraclePrice, param: MarketParam) {
        self.prices.insert(price.market_id, price);
        self.params.insert(param.id, param);
    }

    /// Update a market's price.
    pub fn set_price(&mut self, price: OraclePrice) {
        self.prices.insert(price.market_id, price);
    }
}

impl PriceOracle for MemoryOracle {
    fn market_price(&self, market_id: u32) -> MmResult<OraclePrice> {
        self.prices
            .get(&market_id)
            .copied()
            .ok_or(MmError::MarketNotFound(market_id))
    }

    fn market_param(&self, market_id: u32) -> MmResult<MarketParam> {
        self.params
            .get(&market_id)
            .cloned()
            .ok_or(MmError::MarketNotFound(market_id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryClobPairs {
    pairs: BTreeMap<u32, ClobPairConfig>,
}

impl MemoryClobPairs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, pair: ClobPairConfig) {
        self.pairs.insert(pair.id, pair);
    }

    pub fn remove(&mut self, id: u32) -> Option<ClobPairConfig> {
        self.pairs.remove(&id)
    }
}

impl ClobPairSource for MemoryClobPairs {
    fn clob_pair(&self, id: u32) -> MmResult<ClobPairConfig> {
        self.pairs
            .get(&id)
            .cloned()
            .ok_or(MmError::ClobPairNotFound(id))
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryParamStore {
    params: VaultParams,
}

impl MemoryParamStore {
    pub fn new(params: VaultParams) -> Self {
        Self { params }
    }

    pub fn set(&mut self, params: VaultParams) {
        self.params = params;
    }
}

impl ParamStore for MemoryParamStore {
    fn params(&self) -> MmResult<VaultParams> {
        Ok(self.params.clone())
    }
}

/// A mutation applied to the book, in call order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookCall {
    Cancel(OrderId),
    Place(OrderId),
}

/// Order book keyed by order id.
///
/// Placing an id that already rests replaces it. Cancelling an id that
/// does not rest is rejected.
#[derive(Debug, Clone, Default)]
pub struct MemoryOrderBook {
    orders: BTreeMap<OrderId, Order>,
    calls: Vec<BookCall>,
}

impl MemoryOrderBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn orders(&self) -> impl Iterator<Item = &Order> {
        self.orders.values()
    }

    pub fn get(&self, order_id: &OrderId) -> Option<&Order> {
        self.orders.get(order_id)
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    /// Mutations applied so far.
    pub fn calls(&self) -> &[BookCall] {
        &self.calls
    }

    pub fn clear_calls(&mut self) {
        self.calls.clear();
    }

    /// Drop orders whose good-til time is before `block_time`. Returns how many were dropped.
    pub fn remove_expired(&mut self, block_time: u32) -> usize {
        let before = self.orders.len();
        self.orders
            .retain(|_, order| order.good_til_block_time >= block_time);
        before - self.orders.len()
    }
}

impl OrderBook for MemoryOrderBook {
    fn has_order(&self, order_id: &OrderId) -> bool {
        self.orders.contains_key(order_id)
    }

    fn cancel_stateful_order(&mut self, request: &CancelRequest) -> MmResult<()> {
        if self.orders.remove(&request.order_id).is_none() {
            return Err(MmError::OrderBook(format!(
                "order {} does not exist",
                request.order_id
            )));
        }
        self.calls.push(BookCall::Cancel(request.order_id.clone()));
        Ok(())
    }

    fn place_stateful_order(&mut self, order: &Order) -> MmResult<()> {
        self.orders.insert(order.order_id.clone(), order.clone());
        self.calls.push(BookCall::Place(order.order_id.clone()));
        Ok(())
    }
}
