//! Categorical encodings
//!
//! Fixed tables turning textual signals into the numbers the model was
//! trained on. Lookups are case-insensitive and whitespace-trimmed.

/// Score for a grade that is present but not in the table
const UNKNOWN_GRADE_NUM: f32 = 50.0;

const SSL_GRADES: &[(&str, f32)] = &[
    ("a+", 0.0),
    ("a", 0.0),
    ("a-", 5.0),
    ("b", 20.0),
    ("c", 40.0),
    ("d", 60.0),
    ("e", 80.0),
    ("f", 90.0),
    ("t", 100.0),
];

const SOCIAL_PRESENCE: &[(&str, f32)] = &[
    ("none", 0.0),
    ("low", 20.0),
    ("medium", 50.0),
    ("high", 80.0),
];

/// Trimmed lower-case form, `None` for blanks
pub fn normalize_category(value: Option<&str>) -> Option<String> {
    let v = value?.trim();
    if v.is_empty() {
        return None;
    }
    Some(v.to_lowercase())
}

/// A+/A → 0 … T → 100; unknown grade → 50; absent → 0
pub fn ssl_grade_num(grade: Option<&str>) -> f32 {
    match normalize_category(grade) {
        None => 0.0,
        Some(g) => SSL_GRADES
            .iter()
            .find(|(name, _)| *name == g)
            .map(|(_, v)| *v)
            .unwrap_or(UNKNOWN_GRADE_NUM),
    }
}

/// none/low/medium/high → 0/20/50/80; anything else → 0
pub fn social_presence_num(presence: Option<&str>) -> f32 {
    normalize_category(presence)
        .and_then(|p| SOCIAL_PRESENCE.iter().find(|(name, _)| *name == p).map(|(_, v)| *v))
        .unwrap_or(0.0)
}
