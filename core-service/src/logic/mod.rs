//! Logic Module - Scan pipeline
//!
//! Data flows strictly left to right:
//! `target` → `orchestrator` (via `connectors`) → `features` → `model` → `scoring`.
//!
//! - `target` - Target classification and cache keys
//! - `signals` - Signal record (merged raw source output)
//! - `connectors/` - Threat-intelligence source adapters
//! - `orchestrator` - Concurrent fan-out, failure isolation, deterministic merge
//! - `cache` - Scan cache keyed by sanitized target
//! - `features/` - Fixed-layout feature vector
//! - `model/` - Model artifact store + inference
//! - `scoring/` - Boost table, blender, two-stage scorer

pub mod config;
pub mod target;
pub mod signals;
pub mod connectors;
pub mod orchestrator;
pub mod cache;
pub mod features;
pub mod model;
pub mod scoring;
pub mod engine;
