//! Block-by-block simulation.
//!
//! Each block:
//! - applies the scenario's oracle price for that block
//! - drops orders whose good-til time has passed
//! - runs `refresh_all` and collects the emitted quote events

use chrono::Duration;
use tracing::{info, warn};
use vault_core::BlockContext;
use vault_mm::{
    MemoryCapital, MemoryClobPairs, MemoryOracle, MemoryOrderBook, MemoryParamStore,
    OrderRefresher, QuoteEvent, RefreshReport, Sources,
};

use crate::config::SimConfig;
use crate::error::{SimError, SimResult};

/// What happened in one simulated block.
#[derive(Debug, Clone)]
pub struct BlockOutcome {
    pub context: BlockContext,
    /// Orders dropped by expiry before the refresh ran.
    pub expired: usize,
    pub report: RefreshReport,
    pub events: Vec<QuoteEvent>,
}

/// Simulated chain state driven by a scenario.
pub struct Simulation {
    config: SimConfig,
    capital: MemoryCapital,
    oracle: MemoryOracle,
    clob_pairs: MemoryClobPairs,
    params: MemoryParamStore,
    book: MemoryOrderBook,
    next_block: u32,
}

impl Simulation {
    pub fn new(config: SimConfig) -> SimResult<Self> {
        config.validate()?;

        let mut oracle = MemoryOracle::new();
        for market in &config.markets {
            oracle.set_market(market.price_at(0), market.market_param());
        }

        let mut clob_pairs = MemoryClobPairs::new();
        for pair in &config.clob_pairs {
            clob_pairs.insert(pair.clone());
        }

        let mut capital = MemoryCapital::new();
        for vault in &config.vaults {
            capital.set_balances(
                vault.vault_id(),
                i128::from(vault.quote_quantums),
                i128::from(vault.inventory_base_quantums),
                u128::from(vault.total_shares),
            );
        }

        info!(
            markets = config.markets.len(),
            clob_pairs = config.clob_pairs.len(),
            vaults = config.vaults.len(),
            blocks = config.block.count,
            "Simulation initialized"
        );

        Ok(Self {
            params: MemoryParamStore::new(config.params.clone()),
            config,
            capital,
            oracle,
            clob_pairs,
            book: MemoryOrderBook::new(),
            next_block: 0,
        })
    }

    /// Context of block `index` (0-based).
    pub fn context(&self, index: u32) -> BlockContext {
        let block = &self.config.block;
        let offset = i64::from(index) * i64::from(block.interval_seconds);
        BlockContext::new(
            block.start_height + i64::from(index),
            block.start_time + Duration::seconds(offset),
        )
    }

    pub fn is_finished(&self) -> bool {
        self.next_block >= self.config.block.count
    }

    pub fn book(&self) -> &MemoryOrderBook {
        &self.book
    }

    /// Capital store, for scenarios that change balances between blocks.
    pub fn capital_mut(&mut self) -> &mut MemoryCapital {
        &mut self.capital
    }

    /// Order-book pairs, for scenarios that add or remove pairs between blocks.
    pub fn clob_pairs_mut(&mut self) -> &mut MemoryClobPairs {
        &mut self.clob_pairs
    }

    /// Run the next block.
    pub fn step(&mut self) -> SimResult<BlockOutcome> {
        let index = self.next_block;
        let ctx = self.context(index);

        for market in &self.config.markets {
            self.oracle.set_price(market.price_at(index));
        }

        let expired = self.book.remove_expired(ctx.unix_seconds());

        let sources = Sources {
            capital: &self.capital,
            oracle: &self.oracle,
            clob_pairs: &self.clob_pairs,
            params: &self.params,
        };
        let mut events = Vec::new();
        let report = OrderRefresher::new(sources, &mut self.book, &mut events)
            .refresh_all(&ctx)
            .map_err(|source| SimError::Refresh {
                height: ctx.height,
                source,
            })?;

        for (vault, e) in &report.failed {
            warn!(vault = %vault, height = ctx.height, error = %e, "Vault skipped this block");
        }
        info!(
            height = ctx.height,
            expired,
            placed = report.orders_placed(),
            cancelled = report.orders_cancelled(),
            resting = self.book.len(),
            "Block complete"
        );

        self.next_block += 1;
        Ok(BlockOutcome {
            context: ctx,
            expired,
            report,
            events,
        })
    }

    /// Run every remaining block.
    pub fn run(&mut self) -> SimResult<Vec<BlockOutcome>> {
        let mut outcomes = Vec::new();
        while !self.is_finished() {
            outcomes.push(self.step()?);
        }
        Ok(outcomes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BlockConfig, MarketConfig, VaultConfig};
    use vault_core::{ClobPairConfig, QUOTE_ATOMIC_RESOLUTION};

    fn config() -> SimConfig {
        SimConfig {
            block: BlockConfig {
                count: 3,
                interval_seconds: 2,
                ..Default::default()
            },
            markets: vec![MarketConfig {
                id: 0,
                pair: "BTC-USD".to_string(),
                mantissa: 5_000_000,
                exponent: -5,
                min_price_change_ppm: 50,
                price_path: Vec::new(),
            }],
            clob_pairs: vec![ClobPairConfig {
                id: 0,
                market_id: 0,
                subticks_per_tick: 5,
                step_base_quantums: 5,
                quantum_conversion_exponent: -8,
                base_atomic_resolution: -10,
                quote_atomic_resolution: QUOTE_ATOMIC_RESOLUTION,
            }],
            vaults: vec![VaultConfig {
                number: 0,
                quote_quantums: 1_000_000_000,
                inventory_base_quantums: 0,
                total_shares: 1_000,
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_context_advances_height_and_time() {
        let sim = Simulation::new(config()).unwrap();
        let first = sim.context(0);
        let third = sim.context(2);
        assert_eq!(third.height, first.height + 2);
        assert_eq!(third.unix_seconds(), first.unix_seconds() + 4);
    }

    #[test]
    fn test_run_all_blocks() {
        let mut sim = Simulation::new(config()).unwrap();
        let outcomes = sim.run().unwrap();
        assert_eq!(outcomes.len(), 3);
        assert!(sim.is_finished());
        assert_eq!(outcomes[0].report.orders_cancelled(), 0);
        assert_eq!(outcomes[1].report.orders_cancelled(), 4);
        assert!(outcomes.iter().all(|o| o.events.len() == 4));
        assert_eq!(sim.book().len(), 4);
    }
}
