//! Quote ladder pricing.
//!
//! Turns a vault's equity, inventory and the oracle price into a ladder of
//! tick-aligned quotes:
//!
//! ```text
//! spread     = max(spread_min, spread_buffer + min_price_change)
//! leverage   = open_notional / equity
//! size       = floor_step(order_size_pct * equity / oracle_price)
//! leverage_i = leverage -/+ i * order_size_pct      (ask / bid)
//! skew_i     = -leverage_i * spread * skew_factor
//! ask_i      = ceil_tick(max(oracle * (1 + skew_i + spread * (i+1)), oracle))
//! bid_i      = floor_tick(min(oracle * (1 + skew_i - spread * (i+1)), oracle))
//! ```
//!
//! Long inventory pushes both sides down, short inventory pushes both up.
//! Quotes never cross the oracle price, with one exception: a bid is never
//! below one tick, so on a pair whose oracle price is under one tick the
//! bid rests at one tick, above the oracle.

use num_bigint::BigInt;
use tracing::debug;
use vault_core::fixed::to_u64;
use vault_core::{
    BlockContext, ClobPairConfig, OraclePrice, Order, OrderSide, Ratio, Rounding, VaultId,
};

use crate::client_id::{ladder_slots, vault_order_id};
use crate::collaborators::Sources;
use crate::error::{MmError, MmResult};
use crate::params::{ppm_fraction, VaultParams};

/// One rung of the ladder (one side).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quote {
    pub side: OrderSide,
    pub layer: u8,
    /// Price in subticks, a positive multiple of `subticks_per_tick`.
    pub subticks: u64,
    /// Size in base quantums, a multiple of `step_base_quantums`.
    pub quantums: u64,
}

/// Everything the pricer needs for one vault.
#[derive(Debug, Clone)]
pub struct PricingInputs<'a> {
    pub vault: VaultId,
    /// Quote quantums plus marked-to-oracle inventory.
    pub equity: Ratio,
    /// Inventory notional in quote quantums (signed).
    pub open_notional: Ratio,
    pub oracle_price: &'a OraclePrice,
    pub min_price_change_ppm: u32,
    pub clob_pair: &'a ClobPairConfig,
    pub params: &'a VaultParams,
}

impl<'a> PricingInputs<'a> {
    /// Build inputs from raw balances.
    pub fn from_balances(
        vault: VaultId,
        quote_quantums: i128,
        inventory_base_quantums: i128,
        oracle_price: &'a OraclePrice,
        min_price_change_ppm: u32,
        clob_pair: &'a ClobPairConfig,
        params: &'a VaultParams,
    ) -> MmResult<Self> {
        let open_notional =
            clob_pair.notional_quote_quantums(&BigInt::from(inventory_base_quantums), oracle_price)?;
        let equity = &Ratio::from_integer(quote_quantums) + &open_notional;
        Ok(Self {
            vault,
            equity,
            open_notional,
            oracle_price,
            min_price_change_ppm,
            clob_pair,
            params,
        })
    }
}

/// Compute the quote ladder: ask then bid per layer, innermost first.
///
/// Returns an empty ladder when the order size rounds down to zero.
/// Bids are clamped to at least one tick, even when that is above the
/// oracle price.
pub fn price_ladder(inputs: &PricingInputs<'_>) -> MmResult<Vec<Quote>> {
    let params = inputs.params;
    let pair = inputs.clob_pair;

    if !inputs.equity.is_positive() {
        return Err(MmError::NonPositiveEquity {
            vault: inputs.vault,
            equity: inputs.equity.to_string(),
        });
    }

    let spread_ppm = params
        .spread_min_ppm
        .max(params.spread_buffer_ppm.saturating_add(inputs.min_price_change_ppm));
    let spread = Ratio::from_ppm(spread_ppm);
    let leverage = inputs.open_notional.checked_div(&inputs.equity)?;
    let size_pct = Ratio::from_ppm(params.order_size_pct_ppm);

    let size_quote_quantums = &inputs.equity * &size_pct;
    let size_base_quantums = pair.base_quantums_for_quote(&size_quote_quantums, inputs.oracle_price)?;
    let quantums = to_u64(
        &size_base_quantums.round_to_multiple(pair.step_base_quantums, Rounding::Floor)?,
        "order quantums",
    )?;

    debug!(
        vault = %inputs.vault,
        spread = %ppm_fraction(spread_ppm),
        leverage = ?leverage.to_decimal(),
        quantums,
        "Pricing vault ladder"
    );

    if quantums == 0 {
        debug!(vault = %inputs.vault, "Order size rounds to zero, no quotes");
        return Ok(Vec::new());
    }

    let oracle = pair.oracle_subticks(inputs.oracle_price)?;
    let spread_skew = &spread * &Ratio::from_ppm(params.skew_factor_ppm);
    let one = Ratio::one();

    let mut quotes = Vec::with_capacity(params.ladder_len());
    for (layer, side) in ladder_slots(params.layers) {
        let i = Ratio::from_integer(layer);
        let layer_spread = &spread * &Ratio::from_integer(u32::from(layer) + 1);
        let shift = &i * &size_pct;

        let subticks = match side {
            OrderSide::Sell => {
                // Selling reduces inventory, so the outer ask sees less leverage.
                let leverage_i = &leverage - &shift;
                let skew = -(&leverage_i * &spread_skew);
                let raw = &oracle * &(&(&one + &skew) + &layer_spread);
                raw.max(oracle.clone())
                    .round_to_multiple(pair.subticks_per_tick, Rounding::Ceiling)?
            }
            OrderSide::Buy => {
                let leverage_i = &leverage + &shift;
                let skew = -(&leverage_i * &spread_skew);
                let raw = &oracle * &(&(&one + &skew) - &layer_spread);
                let rounded = raw
                    .min(oracle.clone())
                    .round_to_multiple(pair.subticks_per_tick, Rounding::Floor)?;
                // Deep skew can push a bid through zero; keep it on the book at one tick.
                rounded.max(BigInt::from(pair.subticks_per_tick))
            }
        };

        quotes.push(Quote {
            side,
            layer,
            subticks: to_u64(&subticks, "quote subticks")?,
            quantums,
        });
    }

    Ok(quotes)
}

/// Turn a priced ladder into placeable orders for the block at `ctx`.
pub fn ladder_orders(
    vault: VaultId,
    quotes: &[Quote],
    params: &VaultParams,
    ctx: &BlockContext,
) -> Vec<Order> {
    let good_til_block_time = ctx.good_til_block_time(params.order_expiration_seconds);
    quotes
        .iter()
        .map(|quote| Order {
            order_id: vault_order_id(vault, quote.side, ctx.height, quote.layer),
            side: quote.side,
            quantums: quote.quantums,
            subticks: quote.subticks,
            good_til_block_time,
        })
        .collect()
}

/// Look up a vault's inputs and price its ladder.
///
/// Fails with `ClobPairNotFound` before touching any other collaborator.
pub fn vault_quotes(sources: &Sources<'_>, vault: VaultId, params: &VaultParams) -> MmResult<Vec<Quote>> {
    let clob_pair = sources.clob_pairs.clob_pair(vault.clob_pair_id())?;
    let oracle_price = sources.oracle.market_price(clob_pair.market_id)?;
    let market_param = sources.oracle.market_param(clob_pair.market_id)?;
    let balances = sources.capital.balances(&vault)?;

    let inputs = PricingInputs::from_balances(
        vault,
        balances.quote_quantums,
        balances.inventory_base_quantums,
        &oracle_price,
        market_param.min_price_change_ppm,
        &clob_pair,
        params,
    )?;
    price_ladder(&inputs)
}

/// Orders a vault should rest at `ctx`, in ladder order.
pub fn vault_orders(
    sources: &Sources<'_>,
    vault: VaultId,
    params: &VaultParams,
    ctx: &BlockContext,
) -> MmResult<Vec<Order>> {
    let quotes = vault_quotes(sources, vault, params)?;
    Ok(ladder_orders(vault, &quotes, params, ctx))
}
