//! Per-block cancel and replace of vault quotes.
//!
//! Each block, every slot of a vault's ladder is handled in ladder order:
//! the previous block's order for the slot (recomputed from the opposite
//! height parity) is cancelled if it still rests, then the new quote is
//! placed. Cancel and place for one slot are issued back to back. A book
//! rejection on one slot is logged and the remaining slots are still
//! handled; the first rejection is returned afterwards.

use tracing::{debug, error, info, warn};
use vault_core::{BlockContext, CancelRequest, VaultId};
use vault_telemetry::Metrics;

use crate::client_id::{ladder_slots, vault_order_ids};
use crate::collaborators::{EventSink, OrderBook, Sources};
use crate::error::{MmError, MmResult};
use crate::events::QuoteEvent;
use crate::params::VaultParams;
use crate::pricer::vault_orders;
use crate::vault_set::{is_active, ordered_vault_ids, RefreshReport};

/// Book mutations issued for one vault.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RefreshSummary {
    pub cancelled: usize,
    pub placed: usize,
}

/// Drives quote refreshes against the order book.
pub struct OrderRefresher<'a> {
    sources: Sources<'a>,
    book: &'a mut dyn OrderBook,
    events: &'a mut dyn EventSink,
}

impl<'a> OrderRefresher<'a> {
    pub fn new(
        sources: Sources<'a>,
        book: &'a mut dyn OrderBook,
        events: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            sources,
            book,
            events,
        }
    }

    /// Read and validate the current parameters.
    fn load_params(&self) -> MmResult<VaultParams> {
        let params = self.sources.params.params()?;
        params.validate()?;
        Ok(params)
    }

    /// Refresh a single vault's quotes at `ctx`.
    ///
    /// Does not apply the activation rule.
    pub fn refresh_one(&mut self, ctx: &BlockContext, vault: VaultId) -> MmResult<RefreshSummary> {
        let params = self.load_params()?;
        self.refresh_vault(ctx, vault, &params)
    }

    /// Refresh every active vault at `ctx`.
    ///
    /// Only failures that affect the whole batch are returned as `Err`.
    /// Per-vault failures are logged and collected in the report.
    pub fn refresh_all(&mut self, ctx: &BlockContext) -> MmResult<RefreshReport> {
        let params = self.load_params().map_err(|e| {
            error!(height = ctx.height, error = %e, "Vault params unavailable, skipping refresh");
            e
        })?;
        let vaults = ordered_vault_ids(self.sources.capital).map_err(|e| {
            error!(height = ctx.height, error = %e, "Vault set unavailable, skipping refresh");
            e
        })?;

        let mut report = RefreshReport::default();
        for vault in vaults {
            let balances = match self.sources.capital.balances(&vault) {
                Ok(balances) => balances,
                Err(e) => {
                    error!(vault = %vault, error = %e, "Failed to read vault balances");
                    Metrics::vault_refreshed(false);
                    report.failed.push((vault, e));
                    continue;
                }
            };

            if !is_active(&balances, &params) {
                debug!(
                    vault = %vault,
                    total_shares = balances.total_shares,
                    quote_quantums = balances.quote_quantums,
                    "Vault inactive"
                );
                Metrics::vault_inactive();
                report.inactive.push(vault);
                continue;
            }

            match self.refresh_vault(ctx, vault, &params) {
                Ok(summary) => {
                    Metrics::vault_refreshed(true);
                    report.refreshed.push((vault, summary));
                }
                Err(e) => {
                    error!(vault = %vault, height = ctx.height, error = %e, "Vault refresh failed");
                    Metrics::vault_refreshed(false);
                    report.failed.push((vault, e));
                }
            }
        }

        Metrics::active_vaults(report.active_count());
        info!(
            height = ctx.height,
            refreshed = report.refreshed.len(),
            inactive = report.inactive.len(),
            failed = report.failed.len(),
            "Vault refresh complete"
        );
        Ok(report)
    }

    fn refresh_vault(
        &mut self,
        ctx: &BlockContext,
        vault: VaultId,
        params: &VaultParams,
    ) -> MmResult<RefreshSummary> {
        let previous_ids = vault_order_ids(self.sources.clob_pairs, vault, params, &ctx.previous())?;
        // Priced before any mutation: a pricing failure leaves last block's
        // quotes to expire on their own.
        let orders = vault_orders(&self.sources, vault, params, ctx)?;

        let label = vault.to_string();
        let cancel_good_til = ctx.good_til_block_time(params.order_expiration_seconds);
        let mut summary = RefreshSummary::default();
        let mut first_error: Option<MmError> = None;

        for (slot, ((layer, side), previous_id)) in
            ladder_slots(params.layers).zip(previous_ids).enumerate()
        {
            let mut cancelled = false;
            if self.book.has_order(&previous_id) {
                let request = CancelRequest {
                    order_id: previous_id.clone(),
                    good_til_block_time: cancel_good_til,
                };
                let result = self.book.cancel_stateful_order(&request);
                Metrics::order_cancelled(&label, result.is_ok());
                if let Err(e) = result {
                    // The old quote may still rest, so its slot is not re-placed.
                    warn!(vault = %vault, order_id = %previous_id, error = %e, "Cancel rejected");
                    first_error.get_or_insert(e);
                    continue;
                }
                debug!(vault = %vault, order_id = %previous_id, "Cancelled previous quote");
                cancelled = true;
                summary.cancelled += 1;
            }

            match orders.get(slot) {
                Some(order) => {
                    let result = self.book.place_stateful_order(order);
                    Metrics::order_placed(&label, result.is_ok());
                    if let Err(e) = result {
                        warn!(vault = %vault, order_id = %order.order_id, error = %e, "Place rejected");
                        first_error.get_or_insert(e);
                        continue;
                    }
                    debug!(
                        vault = %vault,
                        order_id = %order.order_id,
                        side = %order.side,
                        subticks = order.subticks,
                        quantums = order.quantums,
                        "Placed quote"
                    );
                    summary.placed += 1;
                    self.events.emit(QuoteEvent::Replaced {
                        vault_id: vault,
                        layer,
                        side,
                        replaced_order_id: previous_id,
                        order: order.clone(),
                    });
                }
                None if cancelled => {
                    self.events.emit(QuoteEvent::Removed {
                        vault_id: vault,
                        layer,
                        side,
                        order_id: previous_id,
                    });
                }
                None => {}
            }
        }

        if let Some(e) = first_error {
            warn!(
                vault = %vault,
                height = ctx.height,
                cancelled = summary.cancelled,
                placed = summary.placed,
                "Vault quotes partially refreshed"
            );
            return Err(e);
        }

        info!(
            vault = %vault,
            height = ctx.height,
            cancelled = summary.cancelled,
            placed = summary.placed,
            "Refreshed vault quotes"
        );
        Ok(summary)
    }
}
