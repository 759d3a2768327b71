//! Deterministic block simulator for vault quoting.
//!
//! Runs the vault refresh engine against in-memory collaborators for a
//! configured number of blocks and exposes the resulting quote events.

pub mod app;
pub mod config;
pub mod error;

pub use app::{BlockOutcome, Simulation};
pub use config::SimConfig;
pub use error::{SimError, SimResult};
