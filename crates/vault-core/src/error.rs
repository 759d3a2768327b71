//! Error types for vault-core.

use thiserror::Error;

/// Core error types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("Zero denominator")]
    ZeroDenominator,

    #[error("Division by zero")]
    DivisionByZero,

    #[error("Rounding step must be positive")]
    InvalidStep,

    #[error("Value out of range: {0}")]
    Overflow(String),

    #[error("Oracle price for market {0} is zero")]
    ZeroPrice(u32),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, CoreError>;
