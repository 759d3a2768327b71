//! Vault quoting parameters.
//!
//! Set by governance, read once per block. All `*_ppm` fields are
//! parts-per-million fractions (1_000_000 = 1.0).

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{MmError, MmResult};

/// Largest ladder depth the client id layout can address.
pub const MAX_LAYERS: u32 = u8::MAX as u32;

/// Parameters shared by every vault.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultParams {
    /// Number of quote layers per side.
    #[serde(default = "default_layers")]
    pub layers: u32,

    /// Minimum distance from oracle to the innermost quote.
    #[serde(default = "default_spread_min_ppm")]
    pub spread_min_ppm: u32,

    /// Added to the market's minimum price change to form a spread floor.
    #[serde(default = "default_spread_buffer_ppm")]
    pub spread_buffer_ppm: u32,

    /// How strongly leverage shifts quotes. May exceed 1.0.
    #[serde(default = "default_skew_factor_ppm")]
    pub skew_factor_ppm: u32,

    /// Size of each quote as a fraction of equity.
    #[serde(default = "default_order_size_pct_ppm")]
    pub order_size_pct_ppm: u32,

    /// Lifetime of each quote after its block time.
    #[serde(default = "default_order_expiration_seconds")]
    pub order_expiration_seconds: u32,

    /// Quote balance a vault needs before it starts quoting.
    #[serde(default = "default_activation_threshold_quote_quantums")]
    pub activation_threshold_quote_quantums: i64,
}

impl Default for VaultParams {
    fn default() -> Self {
        Self {
            layers: default_layers(),
            spread_min_ppm: default_spread_min_ppm(),
            spread_buffer_ppm: default_spread_buffer_ppm(),
            skew_factor_ppm: default_skew_factor_ppm(),
            order_size_pct_ppm: default_order_size_pct_ppm(),
            order_expiration_seconds: default_order_expiration_seconds(),
            activation_threshold_quote_quantums: default_activation_threshold_quote_quantums(),
        }
    }
}

fn default_layers() -> u32 {
    2
}
fn default_spread_min_ppm() -> u32 {
    10_000 // 100 bps
}
fn default_spread_buffer_ppm() -> u32 {
    1_500 // 15 bps
}
fn default_skew_factor_ppm() -> u32 {
    2_000_000 // 2.0
}
fn default_order_size_pct_ppm() -> u32 {
    100_000 // 10%
}
fn default_order_expiration_seconds() -> u32 {
    2
}
fn default_activation_threshold_quote_quantums() -> i64 {
    1_000_000_000 // 1,000 USDC
}

impl VaultParams {
    /// Reject parameter sets the pricer cannot work with.
    pub fn validate(&self) -> MmResult<()> {
        if self.layers > MAX_LAYERS {
            return Err(MmError::InvalidParams(format!(
                "layers {} exceeds {MAX_LAYERS}",
                self.layers
            )));
        }
        if self.spread_min_ppm == 0 {
            return Err(MmError::InvalidParams("spread_min_ppm is zero".to_string()));
        }
        if self.order_size_pct_ppm == 0 {
            return Err(MmError::InvalidParams(
                "order_size_pct_ppm is zero".to_string(),
            ));
        }
        if self.order_expiration_seconds == 0 {
            return Err(MmError::InvalidParams(
                "order_expiration_seconds is zero".to_string(),
            ));
        }
        if self.activation_threshold_quote_quantums < 0 {
            return Err(MmError::InvalidParams(format!(
                "activation_threshold_quote_quantums {} is negative",
                self.activation_threshold_quote_quantums
            )));
        }
        Ok(())
    }

    /// Number of orders in a full ladder (one ask and one bid per layer).
    pub fn ladder_len(&self) -> usize {
        self.layers as usize * 2
    }
}

/// Human-readable view of a ppm value, for logs.
pub fn ppm_fraction(ppm: u32) -> Decimal {
    Decimal::new(i64::from(ppm), 6).normalize()
}
