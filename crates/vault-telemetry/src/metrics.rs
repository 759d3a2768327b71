//! Prometheus metrics for vault quoting.
//!
//! Metrics are write-only: nothing in the refresh path reads them back, so
//! they cannot influence what a node quotes.
//!
//! # Panics
//!
//! Metric registration uses `unwrap()`. A registration failure means a
//! duplicate metric name, which is a programming error caught on first use.

use once_cell::sync::Lazy;
use prometheus::{
    register_counter_vec, register_int_gauge, CounterVec, Encoder, IntGauge, TextEncoder,
};

use crate::error::{TelemetryError, TelemetryResult};

/// Vault orders placed.
/// Labels: vault, result (success/failure)
pub static ORDERS_PLACED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vault_orders_placed_total",
        "Total vault orders placed",
        &["vault", "result"]
    )
    .unwrap()
});

/// Vault orders cancelled.
/// Labels: vault, result (success/failure)
pub static ORDERS_CANCELLED_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vault_orders_cancelled_total",
        "Total vault orders cancelled",
        &["vault", "result"]
    )
    .unwrap()
});

/// Per-vault refresh outcomes.
/// Labels: result (success/failure/inactive)
pub static REFRESH_TOTAL: Lazy<CounterVec> = Lazy::new(|| {
    register_counter_vec!(
        "vault_refresh_total",
        "Total per-vault order refreshes",
        &["result"]
    )
    .unwrap()
});

/// Vaults that passed activation in the last batch.
pub static ACTIVE_VAULTS: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("vault_active_vaults", "Vaults quoting in the last block").unwrap()
});

fn result_label(success: bool) -> &'static str {
    if success {
        "success"
    } else {
        "failure"
    }
}

/// Metrics facade.
pub struct Metrics;

impl Metrics {
    /// Record an order placement attempt.
    pub fn order_placed(vault: &str, success: bool) {
        ORDERS_PLACED_TOTAL
            .with_label_values(&[vault, result_label(success)])
            .inc();
    }

    /// Record an order cancellation attempt.
    pub fn order_cancelled(vault: &str, success: bool) {
        ORDERS_CANCELLED_TOTAL
            .with_label_values(&[vault, result_label(success)])
            .inc();
    }

    /// Record the outcome of one vault's refresh.
    pub fn vault_refreshed(success: bool) {
        REFRESH_TOTAL
            .with_label_values(&[result_label(success)])
            .inc();
    }

    /// Record a vault skipped by activation criteria.
    pub fn vault_inactive() {
        REFRESH_TOTAL.with_label_values(&["inactive"]).inc();
    }

    /// Set the number of vaults refreshed in the current batch.
    pub fn active_vaults(count: usize) {
        ACTIVE_VAULTS.set(i64::try_from(count).unwrap_or(i64::MAX));
    }
}

/// Render every registered metric in the Prometheus text format.
pub fn encode_metrics() -> TelemetryResult<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| TelemetryError::MetricsEncode(e.to_string()))?;
    String::from_utf8(buffer).map_err(|e| TelemetryError::MetricsEncode(e.to_string()))
}
