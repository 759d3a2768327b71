//! Vault identity.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::order::SubaccountId;

/// Kind of vault.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VaultType {
    /// Vault that quotes on one order-book pair.
    Clob,
}

impl fmt::Display for VaultType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Clob => write!(f, "clob"),
        }
    }
}

/// Unique vault identifier.
///
/// For `VaultType::Clob` the number is the id of the order-book pair the
/// vault quotes on. Ordering is by (type, number), which is the order
/// vaults are refreshed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct VaultId {
    #[serde(rename = "type")]
    pub vault_type: VaultType,
    pub number: u32,
}

impl VaultId {
    pub fn new(vault_type: VaultType, number: u32) -> Self {
        Self { vault_type, number }
    }

    pub fn clob(number: u32) -> Self {
        Self::new(VaultType::Clob, number)
    }

    /// Order-book pair this vault quotes on.
    pub fn clob_pair_id(&self) -> u32 {
        self.number
    }

    /// Subaccount that owns the vault's orders.
    pub fn to_subaccount_id(&self) -> SubaccountId {
        SubaccountId {
            owner: format!("vault-{}-{}", self.vault_type, self.number),
            number: 0,
        }
    }
}

impl fmt::Display for VaultId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.vault_type, self.number)
    }
}
