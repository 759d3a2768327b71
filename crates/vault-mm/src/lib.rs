//! Market-making engine for protocol-owned vaults.
//!
//! Once per block, every active vault re-quotes a ladder of resting
//! orders around the oracle price:
//! - Ladder pricing with inventory skew, bounded by the oracle
//! - Stateless cancel/replace via parity-encoded client ids
//! - Deterministic vault traversal and quote notifications
//!
//! # Architecture
//!
//! ```text
//! Block → OrderRefresher.refresh_all()
//!          ├─ ParamStore: read + validate VaultParams
//!          ├─ vault_set: ordered ids, activation rule
//!          └─ per vault: refresh_one()
//!               ├─ client_id: previous ids at height - 1
//!               ├─ pricer: ladder from equity, inventory, oracle
//!               └─ OrderBook: cancel previous → place new (per slot)
//!                    ↓
//!               EventSink: QuoteEvent::Replaced / Removed
//! ```

pub mod client_id;
pub mod collaborators;
pub mod error;
pub mod events;
pub mod memory;
pub mod params;
pub mod pricer;
pub mod refresher;
pub mod vault_set;

pub use collaborators::{
    CapitalAccounting, ClobPairSource, EventSink, OrderBook, ParamStore, PriceOracle, Sources,
    VaultBalances,
};
pub use error::{MmError, MmResult};
pub use events::QuoteEvent;
pub use memory::{
    BookCall, MemoryCapital, MemoryClobPairs, MemoryOracle, MemoryOrderBook, MemoryParamStore,
};
pub use params::VaultParams;
pub use pricer::{price_ladder, vault_orders, PricingInputs, Quote};
pub use refresher::{OrderRefresher, RefreshSummary};
pub use vault_set::RefreshReport;
