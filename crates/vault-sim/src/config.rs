//! Scenario configuration.
//!
//! A scenario describes the blocks to run, the governance parameters, and
//! the markets, pairs and vaults that exist at the first block.

use std::collections::BTreeSet;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use vault_core::{ClobPairConfig, MarketParam, OraclePrice, VaultId};
use vault_mm::VaultParams;

use crate::error::{SimError, SimResult};

/// Env var consulted when no `--config` is given.
pub const CONFIG_ENV_VAR: &str = "VAULT_SIM_CONFIG";

/// Fallback scenario path.
pub const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Full scenario.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimConfig {
    #[serde(default)]
    pub block: BlockConfig,

    #[serde(default)]
    pub params: VaultParams,

    #[serde(default)]
    pub markets: Vec<MarketConfig>,

    #[serde(default)]
    pub clob_pairs: Vec<ClobPairConfig>,

    #[serde(default)]
    pub vaults: Vec<VaultConfig>,
}

/// Block schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockConfig {
    #[serde(default = "default_start_height")]
    pub start_height: i64,

    /// RFC 3339 timestamp of the first block.
    #[serde(default = "default_start_time")]
    pub start_time: DateTime<Utc>,

    #[serde(default = "default_interval_seconds")]
    pub interval_seconds: u32,

    /// Number of blocks to run.
    #[serde(default = "default_block_count")]
    pub count: u32,
}

fn default_start_height() -> i64 {
    1
}

fn default_start_time() -> DateTime<Utc> {
    // 2024-01-01T00:00:00Z
    DateTime::<Utc>::from_timestamp(1_704_067_200, 0).unwrap_or_default()
}

fn default_interval_seconds() -> u32 {
    1
}

fn default_block_count() -> u32 {
    10
}

impl Default for BlockConfig {
    fn default() -> Self {
        Self {
            start_height: default_start_height(),
            start_time: default_start_time(),
            interval_seconds: default_interval_seconds(),
            count: default_block_count(),
        }
    }
}

/// Oracle market.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MarketConfig {
    pub id: u32,

    #[serde(default)]
    pub pair: String,

    /// Price mantissa at the first block.
    pub mantissa: u64,

    pub exponent: i32,

    #[serde(default)]
    pub min_price_change_ppm: u32,

    /// Per-block price mantissas. The last entry holds for later blocks.
    #[serde(default)]
    pub price_path: Vec<u64>,
}

impl MarketConfig {
    /// Oracle price at block `index` (0-based).
    pub fn price_at(&self, index: u32) -> OraclePrice {
        let mantissa = match self.price_path.len() {
            0 => self.mantissa,
            len => self.price_path[(index as usize).min(len - 1)],
        };
        OraclePrice::new(self.id, mantissa, self.exponent)
    }

    pub fn market_param(&self) -> MarketParam {
        MarketParam {
            id: self.id,
            pair: self.pair.clone(),
            min_price_change_ppm: self.min_price_change_ppm,
        }
    }
}

/// Vault with its starting balances.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultConfig {
    /// Clob pair the vault quotes on.
    pub number: u32,

    pub quote_quantums: i64,

    #[serde(default)]
    pub inventory_base_quantums: i64,

    pub total_shares: u64,
}

impl VaultConfig {
    pub fn vault_id(&self) -> VaultId {
        VaultId::clob(self.number)
    }
}

impl SimConfig {
    /// Resolve the scenario path: CLI arg > `VAULT_SIM_CONFIG` > default.
    pub fn resolve_path(cli: Option<String>) -> String {
        cli.or_else(|| std::env::var(CONFIG_ENV_VAR).ok())
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string())
    }

    /// Load from the resolved path, falling back to defaults when the
    /// default file is absent.
    pub fn load(cli: Option<String>) -> SimResult<Self> {
        let explicit = cli.is_some() || std::env::var(CONFIG_ENV_VAR).is_ok();
        let path = Self::resolve_path(cli);

        if explicit || Path::new(&path).exists() {
            Self::from_file(&path)
        } else {
            tracing::warn!(path = %path, "Config file not found, using defaults");
            Ok(Self::default())
        }
    }

    /// Load from a specific file.
    pub fn from_file(path: &str) -> SimResult<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| SimError::Config(format!("Failed to read config {path}: {e}")))?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML scenario.
    pub fn from_toml(content: &str) -> SimResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| SimError::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Check the scenario is self-consistent.
    ///
    /// Vaults may reference pairs that do not exist; the refresh reports
    /// those per vault instead.
    pub fn validate(&self) -> SimResult<()> {
        self.params
            .validate()
            .map_err(|e| SimError::Config(e.to_string()))?;

        if self.block.interval_seconds == 0 {
            return Err(SimError::Config("block.interval_seconds is zero".to_string()));
        }

        let mut market_ids = BTreeSet::new();
        for market in &self.markets {
            if !market_ids.insert(market.id) {
                return Err(SimError::Config(format!("duplicate market id {}", market.id)));
            }
        }

        let mut pair_ids = BTreeSet::new();
        for pair in &self.clob_pairs {
            if !pair_ids.insert(pair.id) {
                return Err(SimError::Config(format!("duplicate clob pair id {}", pair.id)));
            }
            if !market_ids.contains(&pair.market_id) {
                return Err(SimError::Config(format!(
                    "clob pair {} references unknown market {}",
                    pair.id, pair.market_id
                )));
            }
            if pair.subticks_per_tick == 0 || pair.step_base_quantums == 0 {
                return Err(SimError::Config(format!(
                    "clob pair {} has a zero tick or step",
                    pair.id
                )));
            }
        }

        let mut vault_ids = BTreeSet::new();
        for vault in &self.vaults {
            if !vault_ids.insert(vault.number) {
                return Err(SimError::Config(format!("duplicate vault {}", vault.number)));
            }
        }

        Ok(())
    }
}
