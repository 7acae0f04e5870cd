//! Features Module - Feature Normalizer
//!
//! Turns the merged signal record into the fixed feature vector the risk
//! model consumes.
//!
//! # Components
//! - `layout.rs`: authoritative feature order, version and layout hash
//! - `encoding.rs`: categorical tables (TLS grade, social presence)
//! - `vector.rs`: `FeatureVector`
//! - `normalizer.rs`: `normalize(&SignalRecord) -> FeatureVector`

pub mod layout;
pub mod encoding;
pub mod vector;
pub mod normalizer;


pub use layout::{LayoutInfo, FEATURE_COUNT, FEATURE_LAYOUT};
pub use normalizer::normalize;
pub use vector::{Categoricals, FeatureVector};
