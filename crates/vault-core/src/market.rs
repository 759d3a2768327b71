//! Oracle price and order-book pair configuration.
//!
//! Prices arrive as `mantissa * 10^exponent` (quote per one whole base
//! unit). The order book works in integer units instead: sizes in base
//! quantums, prices in subticks. The conversions here are exact.

use num_bigint::BigInt;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};
use crate::fixed::Ratio;

/// Atomic resolution of the quote asset (1 quote quantum = 10^-6 units).
pub const QUOTE_ATOMIC_RESOLUTION: i32 = -6;

/// Oracle price for a market.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct OraclePrice {
    pub market_id: u32,
    pub mantissa: u64,
    pub exponent: i32,
}

impl OraclePrice {
    pub fn new(market_id: u32, mantissa: u64, exponent: i32) -> Self {
        Self {
            market_id,
            mantissa,
            exponent,
        }
    }

    pub fn is_zero(&self) -> bool {
        self.mantissa == 0
    }
}

/// Per-market oracle parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketParam {
    pub id: u32,
    /// Display pair, e.g. "BTC-USD".
    #[serde(default)]
    pub pair: String,
    /// Minimum price change the oracle reports, in ppm. Opaque to quoting.
    pub min_price_change_ppm: u32,
}

/// Static configuration of one order-book pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClobPairConfig {
    pub id: u32,
    /// Oracle market backing this pair.
    pub market_id: u32,
    /// Valid prices are multiples of this many subticks.
    pub subticks_per_tick: u64,
    /// Valid sizes are multiples of this many base quantums.
    pub step_base_quantums: u64,
    pub quantum_conversion_exponent: i32,
    pub base_atomic_resolution: i32,
    #[serde(default = "default_quote_atomic_resolution")]
    pub quote_atomic_resolution: i32,
}

fn default_quote_atomic_resolution() -> i32 {
    QUOTE_ATOMIC_RESOLUTION
}

impl ClobPairConfig {
    /// Oracle price expressed in subticks (not yet tick aligned).
    ///
    /// `mantissa * 10^(exponent - qce + base_res - quote_res)`
    pub fn oracle_subticks(&self, price: &OraclePrice) -> Result<Ratio> {
        let exp = price
            .exponent
            .checked_sub(self.quantum_conversion_exponent)
            .and_then(|e| e.checked_add(self.base_atomic_resolution))
            .and_then(|e| e.checked_sub(self.quote_atomic_resolution))
            .ok_or_else(|| self.exponent_overflow(price))?;
        Ok(&Ratio::from_integer(price.mantissa) * &Ratio::pow10(exp)?)
    }

    /// Quote quantums per base quantum at `price`.
    fn quote_per_base_quantum(&self, price: &OraclePrice) -> Result<Ratio> {
        let exp = price
            .exponent
            .checked_add(self.base_atomic_resolution)
            .and_then(|e| e.checked_sub(self.quote_atomic_resolution))
            .ok_or_else(|| self.exponent_overflow(price))?;
        Ok(&Ratio::from_integer(price.mantissa) * &Ratio::pow10(exp)?)
    }

    fn exponent_overflow(&self, price: &OraclePrice) -> CoreError {
        CoreError::Overflow(format!(
            "price exponent {} on clob pair {}",
            price.exponent, self.id
        ))
    }

    /// Signed notional, in quote quantums, of a base position.
    pub fn notional_quote_quantums(&self, base_quantums: &BigInt, price: &OraclePrice) -> Result<Ratio> {
        Ok(&Ratio::from_integer(base_quantums.clone()) * &self.quote_per_base_quantum(price)?)
    }

    /// Base quantums worth `quote_quantums` at `price` (unrounded).
    pub fn base_quantums_for_quote(&self, quote_quantums: &Ratio, price: &OraclePrice) -> Result<Ratio> {
        if price.is_zero() {
            return Err(CoreError::ZeroPrice(price.market_id));
        }
        quote_quantums.checked_div(&self.quote_per_base_quantum(price)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn btc_pair() -> ClobPairConfig {
        ClobPairConfig {
            id: 0,
            market_id: 0,
            subticks_per_tick: 5,
            step_base_quantums: 5,
            quantum_conversion_exponent: -8,
            base_atomic_resolution: -10,
            quote_atomic_resolution: QUOTE_ATOMIC_RESOLUTION,
        }
    }

    fn eth_pair() -> ClobPairConfig {
        ClobPairConfig {
            id: 1,
            market_id: 1,
            subticks_per_tick: 1000,
            step_base_quantums: 1000,
            quantum_conversion_exponent: -9,
            base_atomic_resolution: -9,
            quote_atomic_resolution: QUOTE_ATOMIC_RESOLUTION,
        }
    }

    #[test]
    fn test_oracle_subticks() {
        // $50 BTC: 5_000_000 * 10^(-5 + 8 - 10 + 6) = 500_000
        let price = OraclePrice::new(0, 5_000_000, -5);
        assert_eq!(
            btc_pair().oracle_subticks(&price).unwrap(),
            Ratio::from_integer(500_000)
        );

        // $3000 ETH: 3_000_000_000 * 10^(-6 + 9 - 9 + 6) = 3e9
        let price = OraclePrice::new(1, 3_000_000_000, -6);
        assert_eq!(
            eth_pair().oracle_subticks(&price).unwrap(),
            Ratio::from_integer(3_000_000_000u64)
        );
    }

    #[test]
    fn test_notional_quote_quantums() {
        // -0.5 ETH at $3000 = -1500 USDC = -1_500_000_000 quote quantums
        let price = OraclePrice::new(1, 3_000_000_000, -6);
        let notional = eth_pair()
            .notional_quote_quantums(&BigInt::from(-500_000_000), &price)
            .unwrap();
        assert_eq!(notional, Ratio::from_integer(-1_500_000_000i64));
    }

    #[test]
    fn test_base_quantums_for_quote() {
        // 100 USDC at $50 = 2 BTC = 2e10 base quantums
        let price = OraclePrice::new(0, 5_000_000, -5);
        let base = btc_pair()
            .base_quantums_for_quote(&Ratio::from_integer(100_000_000), &price)
            .unwrap();
        assert_eq!(base, Ratio::from_integer(20_000_000_000u64));
    }

    #[test]
    fn test_base_quantums_zero_price() {
        let price = OraclePrice::new(7, 0, -5);
        assert_eq!(
            btc_pair().base_quantums_for_quote(&Ratio::one(), &price),
            Err(CoreError::ZeroPrice(7))
        );
    }

    #[test]
    fn test_extreme_exponents_overflow() {
        let pair = ClobPairConfig {
            base_atomic_resolution: i32::MAX,
            ..btc_pair()
        };
        let price = OraclePrice::new(0, 5_000_000, 1);
        assert!(matches!(pair.oracle_subticks(&price), Err(CoreError::Overflow(_))));
        assert!(matches!(
            pair.notional_quote_quantums(&BigInt::from(1), &price),
            Err(CoreError::Overflow(_))
        ));

        // Representable sum, but far past any real market.
        let price = OraclePrice::new(0, 5_000_000, -1_000_000);
        assert!(matches!(
            btc_pair().base_quantums_for_quote(&Ratio::one(), &price),
            Err(CoreError::Overflow(_))
        ));
    }

    #[test]
    fn test_quote_resolution_defaults_when_missing() {
        let json = r#"{
            "id": 3,
            "market_id": 3,
            "subticks_per_tick": 10,
            "step_base_quantums": 100,
            "quantum_conversion_exponent": -9,
            "base_atomic_resolution": -9
        }"#;
        let pair: ClobPairConfig = serde_json::from_str(json).unwrap();
        assert_eq!(pair.quote_atomic_resolution, QUOTE_ATOMIC_RESOLUTION);
    }
}
