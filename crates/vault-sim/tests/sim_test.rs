//! Multi-block simulation tests.
//!
//! Drives the refresh engine through the simulator:
//! - Default scenario activation and failure isolation
//! - Cancel/replace across consecutive blocks
//! - Expiry, oracle moves and mid-run pair removal

use std::collections::BTreeMap;

use vault_core::{OrderSide, VaultId};
use vault_mm::{MmError, QuoteEvent};
use vault_sim::{SimConfig, Simulation};

const DEFAULT_SCENARIO: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/default.toml");

const TWO_VAULTS: &str = r#"
[block]
start_height = 1000
start_time = "2024-03-01T12:00:00Z"
interval_seconds = 1
count = 4

[[markets]]
id = 0
pair = "BTC-USD"
mantissa = 5000000
exponent = -5
min_price_change_ppm = 50

[[markets]]
id = 1
pair = "ETH-USD"
mantissa = 3000000000
exponent = -6
min_price_change_ppm = 50
price_path = [3000000000, 3000000000, 3060000000]

[[clob_pairs]]
id = 0
market_id = 0
subticks_per_tick = 5
step_base_quantums = 5
quantum_conversion_exponent = -8
base_atomic_resolution = -10

[[clob_pairs]]
id = 1
market_id = 1
subticks_per_tick = 1000
step_base_quantums = 1000
quantum_conversion_exponent = -9
base_atomic_resolution = -9

[[vaults]]
number = 0
quote_quantums = 1000000000
total_shares = 1000

[[vaults]]
number = 1
quote_quantums = 1000000000
total_shares = 1000
"#;

fn two_vaults() -> SimConfig {
    SimConfig::from_toml(TWO_VAULTS).unwrap()
}

fn orders_per_vault(sim: &Simulation) -> BTreeMap<u32, usize> {
    let mut counts = BTreeMap::new();
    for order in sim.book().orders() {
        *counts.entry(order.order_id.clob_pair_id).or_default() += 1;
    }
    counts
}

#[test]
fn test_default_scenario_runs() {
    let config = SimConfig::from_file(DEFAULT_SCENARIO).unwrap();
    let mut sim = Simulation::new(config).unwrap();
    let outcomes = sim.run().unwrap();
    assert_eq!(outcomes.len(), 10);

    for outcome in &outcomes {
        let refreshed: Vec<VaultId> = outcome.report.refreshed.iter().map(|(v, _)| *v).collect();
        assert_eq!(refreshed, vec![VaultId::clob(0), VaultId::clob(1)]);
        assert_eq!(outcome.report.inactive, vec![VaultId::clob(2)]);
        assert_eq!(
            outcome.report.failed,
            vec![(VaultId::clob(5), MmError::ClobPairNotFound(5))]
        );
        assert_eq!(outcome.events.len(), 8);
    }

    assert_eq!(outcomes[0].report.orders_cancelled(), 0);
    assert!(outcomes[1..]
        .iter()
        .all(|o| o.report.orders_cancelled() == 8 && o.expired == 0));
    assert_eq!(sim.book().len(), 8);
}

#[test]
fn test_runs_are_deterministic() {
    let render = || -> Vec<String> {
        let mut sim = Simulation::new(two_vaults()).unwrap();
        sim.run()
            .unwrap()
            .iter()
            .flat_map(|o| o.events.iter().map(|e| serde_json::to_string(e).unwrap()))
            .collect()
    };
    let first = render();
    assert_eq!(first.len(), 32);
    assert_eq!(first, render());
}

#[test]
fn test_consecutive_blocks_swap_ladders() {
    let mut sim = Simulation::new(two_vaults()).unwrap();
    let first = sim.step().unwrap();
    let placed: Vec<_> = first
        .events
        .iter()
        .filter_map(|e| match e {
            QuoteEvent::Replaced { order, .. } => Some(order.order_id.clone()),
            QuoteEvent::Removed { .. } => None,
        })
        .collect();
    assert_eq!(placed.len(), 8);

    let second = sim.step().unwrap();
    let replaced: Vec<_> = second
        .events
        .iter()
        .filter_map(|e| match e {
            QuoteEvent::Replaced {
                replaced_order_id, ..
            } => Some(replaced_order_id.clone()),
            QuoteEvent::Removed { .. } => None,
        })
        .collect();
    assert_eq!(replaced, placed);

    // One ladder per vault, never both generations.
    assert_eq!(orders_per_vault(&sim), BTreeMap::from([(0, 4), (1, 4)]));
    assert!(placed.iter().all(|id| sim.book().get(id).is_none()));
}

#[test]
fn test_orders_expire_when_blocks_are_slow() {
    let mut config = two_vaults();
    config.block.interval_seconds = 5;
    let mut sim = Simulation::new(config).unwrap();
    let outcomes = sim.run().unwrap();

    assert_eq!(outcomes[0].expired, 0);
    for outcome in &outcomes[1..] {
        assert_eq!(outcome.expired, 8);
        assert_eq!(outcome.report.orders_cancelled(), 0);
        assert_eq!(outcome.report.orders_placed(), 8);
    }
}

#[test]
fn test_oracle_move_shifts_quotes() {
    let mut sim = Simulation::new(two_vaults()).unwrap();
    let outcomes = sim.run().unwrap();

    let eth_best = |index: usize, side: OrderSide| -> u64 {
        outcomes[index]
            .events
            .iter()
            .find_map(|e| match e {
                QuoteEvent::Replaced {
                    vault_id,
                    layer: 0,
                    order,
                    ..
                } if *vault_id == VaultId::clob(1) && order.side == side => Some(order.subticks),
                _ => None,
            })
            .unwrap()
    };

    // Unchanged price, unchanged quotes.
    assert_eq!(eth_best(0, OrderSide::Sell), eth_best(1, OrderSide::Sell));
    // A 2% move lifts both sides.
    assert!(eth_best(2, OrderSide::Sell) > eth_best(1, OrderSide::Sell));
    assert!(eth_best(2, OrderSide::Buy) > eth_best(1, OrderSide::Buy));
    assert!(eth_best(2, OrderSide::Buy) <= 3_060_000_000);
}

#[test]
fn test_pair_removed_mid_run_is_isolated() {
    let mut sim = Simulation::new(two_vaults()).unwrap();
    sim.step().unwrap();

    sim.clob_pairs_mut().remove(1);
    let outcome = sim.step().unwrap();

    assert_eq!(
        outcome.report.failed,
        vec![(VaultId::clob(1), MmError::ClobPairNotFound(1))]
    );
    assert_eq!(outcome.report.refreshed.len(), 1);
    assert!(outcome.events.iter().all(|e| e.vault_id() == VaultId::clob(0)));
    // The failed vault's last ladder is left to expire.
    assert_eq!(orders_per_vault(&sim), BTreeMap::from([(0, 4), (1, 4)]));

    // Expiry is two seconds after the first block.
    sim.step().unwrap();
    sim.step().unwrap();
    assert_eq!(orders_per_vault(&sim), BTreeMap::from([(0, 4)]));
}

#[test]
fn test_deactivated_vault_stops_quoting() {
    let mut sim = Simulation::new(two_vaults()).unwrap();
    sim.step().unwrap();

    sim.capital_mut()
        .set_balances(VaultId::clob(0), 10_000_000, 0, 1_000);
    let outcome = sim.step().unwrap();

    assert_eq!(outcome.report.inactive, vec![VaultId::clob(0)]);
    assert!(outcome.events.iter().all(|e| e.vault_id() == VaultId::clob(1)));
}

#[test]
fn test_empty_ladder_cancels_previous_quotes() {
    let mut config = two_vaults();
    config.vaults.retain(|v| v.number == 1);
    let mut sim = Simulation::new(config).unwrap();
    sim.step().unwrap();
    assert_eq!(sim.book().len(), 4);

    // Equity collapses to 0.022 USDC; 10% of it is below one ETH step.
    sim.capital_mut()
        .set_balances(VaultId::clob(1), 1_000_000_000, -333_326_000, 1_000);
    let outcome = sim.step().unwrap();

    assert!(sim.book().is_empty());
    assert_eq!(outcome.events.len(), 4);
    assert!(outcome
        .events
        .iter()
        .all(|e| matches!(e, QuoteEvent::Removed { .. })));
}
