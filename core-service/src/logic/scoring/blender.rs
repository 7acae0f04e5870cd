//! Score Blender
//!
//! Adjustment stage only: base score in, bounded explainable score out.
//! Deterministic; every added point is traceable to a named rule.

use std::collections::BTreeMap;

use super::rules::{BoostTable, LOW_MAX, MAX_SCORE, MEDIUM_MAX, MIN_SCORE};
use super::types::{BlendSignals, EchoedSignals, RiskCategory, ScoreBreakdown, ScoreResult};

/// Low ≤ 40 < Medium ≤ 70 < High
pub fn category(score: i64) -> RiskCategory {
    if score <= LOW_MAX {
        RiskCategory::Low
    } else if score <= MEDIUM_MAX {
        RiskCategory::Medium
    } else {
        RiskCategory::High
    }
}

/// Apply every rule of `table` on top of `base_score` and clamp to [0, 100]
pub fn blend(
    base_score: i64,
    raw: f64,
    signals: &BlendSignals,
    echoed: &EchoedSignals,
    table: &BoostTable,
) -> ScoreResult {
    let mut boosts = BTreeMap::new();

    for rule in &table.rules {
        let value = signals.value(&rule.signal).unwrap_or(0.0);
        let boost = rule.evaluate(value);
        if boost != 0 {
            log::debug!("{} +{} ({}={})", rule.name, boost, rule.signal, value);
        }
        boosts.insert(rule.name.clone(), boost);
    }

    let amplified = base_score.saturating_add(boosts.values().sum::<i64>());
    let final_score = amplified.clamp(MIN_SCORE, MAX_SCORE);

    ScoreResult {
        score: final_score,
        category: category(final_score),
        raw,
        breakdown: ScoreBreakdown {
            base_score,
            boosts,
            final_before_clamp: amplified,
            final_score,
        },
        echoed_signals: *echoed,
    }
}
