//! Active vault selection.
//!
//! A vault quotes when it has outstanding shares and enough quote balance
//! to cover the activation threshold. Vaults are visited in ascending
//! `(type, number)` order so every node emits the same event stream.

use vault_core::VaultId;

use crate::collaborators::{CapitalAccounting, VaultBalances};
use crate::error::{MmError, MmResult};
use crate::params::VaultParams;
use crate::refresher::RefreshSummary;

/// Whether a vault with these balances should quote.
pub fn is_active(balances: &VaultBalances, params: &VaultParams) -> bool {
    balances.total_shares > 0
        && balances.quote_quantums >= i128::from(params.activation_threshold_quote_quantums)
}

/// Configured vault ids in refresh order, duplicates removed.
pub fn ordered_vault_ids(capital: &dyn CapitalAccounting) -> MmResult<Vec<VaultId>> {
    let mut ids = capital.vault_ids()?;
    ids.sort_unstable();
    ids.dedup();
    Ok(ids)
}

/// Outcome of one batch refresh.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RefreshReport {
    /// Vaults refreshed successfully, in refresh order.
    pub refreshed: Vec<(VaultId, RefreshSummary)>,
    /// Vaults skipped by the activation rule.
    pub inactive: Vec<VaultId>,
    /// Vaults whose refresh failed this block.
    pub failed: Vec<(VaultId, MmError)>,
}

impl RefreshReport {
    /// Vaults that passed the activation rule, whether or not their refresh succeeded.
    pub fn active_count(&self) -> usize {
        self.refreshed.len() + self.failed.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed.is_empty()
    }

    pub fn orders_placed(&self) -> usize {
        self.refreshed.iter().map(|(_, s)| s.placed).sum()
    }

    pub fn orders_cancelled(&self) -> usize {
        self.refreshed.iter().map(|(_, s)| s.cancelled).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborators::MockCapitalAccounting;

    fn balances(quote_quantums: i128, total_shares: u128) -> VaultBalances {
        VaultBalances {
            quote_quantums,
            inventory_base_quantums: 0,
            total_shares,
        }
    }

    #[test]
    fn test_activation_rule() {
        let params = VaultParams::default();
        // Needs both shares and quote at or above the threshold.
        assert!(is_active(&balances(1_000_000_000, 1), &params));
        assert!(is_active(&balances(5_000_000_000, 10), &params));
        assert!(!is_active(&balances(999_999_999, 1), &params));
        assert!(!is_active(&balances(1_000_000_000, 0), &params));
        assert!(!is_active(&balances(-1, 1), &params));
    }

    #[test]
    fn test_zero_threshold_still_needs_shares() {
        let params = VaultParams {
            activation_threshold_quote_quantums: 0,
            ..Default::default()
        };
        assert!(is_active(&balances(0, 1), &params));
        assert!(!is_active(&balances(0, 0), &params));
    }

    #[test]
    fn test_ordered_vault_ids_sorts_and_dedups() {
        let mut capital = MockCapitalAccounting::new();
        capital.expect_vault_ids().returning(|| {
            Ok(vec![
                VaultId::clob(7),
                VaultId::clob(0),
                VaultId::clob(7),
                VaultId::clob(1),
            ])
        });
        assert_eq!(
            ordered_vault_ids(&capital).unwrap(),
            vec![VaultId::clob(0), VaultId::clob(1), VaultId::clob(7)]
        );
    }

    #[test]
    fn test_report_counts() {
        let report = RefreshReport {
            refreshed: vec![
                (VaultId::clob(0), RefreshSummary { cancelled: 4, placed: 4 }),
                (VaultId::clob(1), RefreshSummary { cancelled: 0, placed: 2 }),
            ],
            inactive: vec![VaultId::clob(2)],
            failed: vec![(VaultId::clob(3), MmError::ClobPairNotFound(3))],
        };
        assert_eq!(report.active_count(), 3);
        assert_eq!(report.orders_placed(), 6);
        assert_eq!(report.orders_cancelled(), 4);
        assert!(!report.is_clean());
    }
}
