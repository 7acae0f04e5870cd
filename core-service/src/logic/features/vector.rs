//! Feature Vector - Core data structure for model input
//!
//! Uses the centralized layout from `layout.rs` for consistent ordering,
//! version tracking and a layout hash for compatibility checks.

use serde::{Deserialize, Serialize};

use super::layout::{feature_index, layout_hash, FEATURE_COUNT, FEATURE_LAYOUT, FEATURE_VERSION};

// ============================================================================
// CATEGORICALS
// ============================================================================

/// Raw categorical values, trimmed and lower-cased.
///
/// The numeric columns carry their encodings; these are kept for models
/// trained on one-hot indicator columns instead.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Categoricals {
    pub ssl_grade: Option<String>,
    pub social_presence: Option<String>,
}

impl Categoricals {
    /// Value of a categorical by its signal name
    pub fn get(&self, name: &str) -> Option<&str> {
        match name {
            "ssl_grade" => self.ssl_grade.as_deref(),
            "social_presence" => self.social_presence.as_deref(),
            _ => None,
        }
    }
}

// ============================================================================
// VERSIONED FEATURE VECTOR
// ============================================================================

/// Complete, fixed-length feature vector. Every field is always present.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureVector {
    pub version: u8,
    /// CRC32 hash of the feature layout
    pub layout_hash: u32,
    /// Values in order defined by FEATURE_LAYOUT
    pub values: [f32; FEATURE_COUNT],
    #[serde(default)]
    pub categoricals: Categoricals,
}

impl FeatureVector {
    /// All-zero vector with the current layout
    pub fn new() -> Self {
        Self {
            version: FEATURE_VERSION,
            layout_hash: layout_hash(),
            values: [0.0; FEATURE_COUNT],
            categoricals: Categoricals::default(),
        }
    }

    pub fn get(&self, index: usize) -> Option<f32> {
        self.values.get(index).copied()
    }

    pub fn get_by_name(&self, name: &str) -> Option<f32> {
        feature_index(name).and_then(|i| self.get(i))
    }

    pub fn set(&mut self, index: usize, value: f32) {
        if index < FEATURE_COUNT {
            self.values[index] = value;
        }
    }

    /// Returns false for names outside the layout
    pub fn set_by_name(&mut self, name: &str, value: f32) -> bool {
        match feature_index(name) {
            Some(index) => {
                self.set(index, value);
                true
            }
            None => false,
        }
    }

    pub fn is_compatible(&self) -> bool {
        self.version == FEATURE_VERSION && self.layout_hash == layout_hash()
    }

    /// `(name, value)` pairs in layout order
    pub fn named(&self) -> Vec<(&'static str, f32)> {
        FEATURE_LAYOUT
            .iter()
            .copied()
            .zip(self.values.iter().copied())
            .collect()
    }

    /// Name → value object, for API and report output
    pub fn to_json(&self) -> serde_json::Value {
        let map: serde_json::Map<String, serde_json::Value> = self
            .named()
            .into_iter()
            .map(|(name, value)| (name.to_string(), serde_json::json!(value)))
            .collect();
        serde_json::Value::Object(map)
    }
}

impl Default for FeatureVector {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_vector_new() {
        let vector = FeatureVector::new();
        assert_eq!(vector.version, FEATURE_VERSION);
        assert_eq!(vector.layout_hash, layout_hash());
        assert!(vector.values.iter().all(|v| *v == 0.0));
        assert!(vector.is_compatible());
    }

    #[test]
    fn test_set_by_name() {
        let mut vector = FeatureVector::new();
        assert!(vector.set_by_name("nvd_vuln_count", 12.0));
        assert_eq!(vector.get_by_name("nvd_vuln_count"), Some(12.0));
        assert!(!vector.set_by_name("nonexistent", 1.0));
    }

    #[test]
    fn test_named_follows_layout() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("vt_total_signals", 4.0);

        let named = vector.named();
        assert_eq!(named.len(), FEATURE_COUNT);
        assert_eq!(named[0].0, "email_breached");
        assert_eq!(named[14], ("vt_total_signals", 4.0));
    }

    #[test]
    fn test_to_json() {
        let mut vector = FeatureVector::new();
        vector.set_by_name("ssl_grade_num", 90.0);

        let json = vector.to_json();
        assert_eq!(json["ssl_grade_num"], 90.0);
        assert_eq!(json.as_object().unwrap().len(), FEATURE_COUNT);
    }
}
