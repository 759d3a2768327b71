//! Simulator error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum SimError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Refresh aborted at height {height}: {source}")]
    Refresh {
        height: i64,
        #[source]
        source: vault_mm::MmError,
    },
}

pub type SimResult<T> = Result<T, SimError>;
