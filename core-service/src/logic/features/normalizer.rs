//! Feature Normalizer
//!
//! Flattens a partial [`SignalRecord`] into a complete [`FeatureVector`].
//! Never fails: missing or malformed values become 0.

use super::encoding::{normalize_category, social_presence_num, ssl_grade_num};
use super::vector::{Categoricals, FeatureVector};
use crate::logic::signals::SignalRecord;

/// Features copied straight from the signal of the same name
const DIRECT_FEATURES: &[&str] = &[
    "email_breached",
    "email_breach_count",
    "phone_breached",
    "ip_abuse_score",
    "ip_abuse_reports",
    "shodan_open_ports",
    "shodan_vuln_services",
    "nvd_vuln_count",
    "ssl_expired",
    "business_verified",
    "vt_malicious_score",
    "vt_suspicious_score",
    "vt_total_signals",
];

/// Breach count reported under its source name
const PWNED_COUNT: &str = "pwned_count";

pub fn normalize(signals: &SignalRecord) -> FeatureVector {
    let mut vector = FeatureVector::new();

    for name in DIRECT_FEATURES {
        vector.set_by_name(name, signals.number(name) as f32);
    }

    // Older records only carry the raw breach count
    if !signals.contains_key("email_breach_count") && signals.contains_key(PWNED_COUNT) {
        let pwned = signals.number(PWNED_COUNT) as f32;
        vector.set_by_name("email_breach_count", pwned);
        if !signals.contains_key("email_breached") {
            vector.set_by_name("email_breached", if pwned > 0.0 { 1.0 } else { 0.0 });
        }
    }

    let ssl_grade = signals.text("ssl_grade");
    let social_presence = signals.text("social_presence");

    vector.set_by_name("ssl_grade_num", ssl_grade_num(ssl_grade));
    vector.set_by_name("social_presence_num", social_presence_num(social_presence));

    vector.categoricals = Categoricals {
        ssl_grade: normalize_category(ssl_grade),
        social_presence: normalize_category(social_presence),
    };

    vector
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_booleans_become_flags() {
        let record = SignalRecord::new()
            .with("email_breached", true)
            .with("ssl_expired", "1")
            .with("business_verified", false);
        let vector = normalize(&record);

        assert_eq!(vector.get_by_name("email_breached"), Some(1.0));
        assert_eq!(vector.get_by_name("ssl_expired"), Some(1.0));
        assert_eq!(vector.get_by_name("business_verified"), Some(0.0));
    }

    #[test]
    fn test_pwned_count_fallback() {
        let record = SignalRecord::new().with("pwned_count", 7i64);
        let vector = normalize(&record);

        assert_eq!(vector.get_by_name("email_breach_count"), Some(7.0));
        assert_eq!(vector.get_by_name("email_breached"), Some(1.0));
    }

    #[test]
    fn test_dedicated_breach_keys_win() {
        let record = SignalRecord::new()
            .with("pwned_count", 7i64)
            .with("email_breach_count", 2i64)
            .with("email_breached", false);
        let vector = normalize(&record);

        assert_eq!(vector.get_by_name("email_breach_count"), Some(2.0));
        assert_eq!(vector.get_by_name("email_breached"), Some(0.0));
    }

    #[test]
    fn test_categoricals_kept_for_indicators() {
        let record = SignalRecord::new()
            .with("ssl_grade", " B ")
            .with("social_presence", "HIGH");
        let vector = normalize(&record);

        assert_eq!(vector.get_by_name("ssl_grade_num"), Some(20.0));
        assert_eq!(vector.get_by_name("social_presence_num"), Some(80.0));
        assert_eq!(vector.categoricals.ssl_grade.as_deref(), Some("b"));
        assert_eq!(vector.categoricals.social_presence.as_deref(), Some("high"));
    }
}
