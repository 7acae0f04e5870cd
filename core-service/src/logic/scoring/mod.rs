//! Scoring Module - Score Blender
//!
//! Combines the model's base score with signals outside the model schema
//! into a bounded, explainable final score.
//!
//! ## Structure
//! - `types`: categories, blender inputs, score result
//! - `rules`: versioned boost table and category bounds
//! - `blender`: deterministic adjustment stage
//! - `scorer`: model stage followed by the blender

pub mod types;
pub mod rules;
pub mod blender;
pub mod scorer;

pub use types::{BlendSignals, EchoedSignals, RiskCategory, ScoreBreakdown, ScoreResult};
pub use rules::{BoostRule, BoostTable, BoostTableError, Tier, LOW_MAX, MEDIUM_MAX};
pub use blender::{blend, category};
pub use scorer::RiskScorer;
