//! RiskScan Core
//!
//! Estimates a 0-100 cyber risk score for a domain or IP address.
//!
//! ```text
//! target ─► classify ─► orchestrate sources ─► normalize ─► model ─► blend ─► ScoreResult
//! ```
//!
//! The model stage produces the base score; the blend stage adds auditable,
//! table-driven boosts on top and clamps the result.

pub mod constants;
pub mod error;
pub mod logic;

#[cfg(test)]
pub(crate) mod testutil;

pub use error::{EngineError, EngineResult};
pub use logic::engine::{RiskEngine, ScanOutcome};
pub use logic::config::EngineConfig;
