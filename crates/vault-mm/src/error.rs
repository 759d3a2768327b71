//! Error types for vault-mm.

use thiserror::Error;
use vault_core::{CoreError, VaultId};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MmError {
    #[error("Clob pair not found: {0}")]
    ClobPairNotFound(u32),

    #[error("Vault {vault} has non-positive equity: {equity}")]
    NonPositiveEquity { vault: VaultId, equity: String },

    #[error("Market not found: {0}")]
    MarketNotFound(u32),

    #[error("Vault not found: {0}")]
    VaultNotFound(VaultId),

    #[error("Invalid vault params: {0}")]
    InvalidParams(String),

    #[error("Collaborator unavailable: {0}")]
    Collaborator(String),

    #[error("Order book rejected request: {0}")]
    OrderBook(String),

    #[error("Arithmetic error: {0}")]
    Core(#[from] CoreError),
}

pub type MmResult<T> = Result<T, MmError>;
