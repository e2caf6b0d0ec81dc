//! Category normalization for raw statement labels.
//!
//! Exports carry free-typed labels ("Coffe", "Restuarant"). Known misspellings map
//! to a display name and group; anything else keeps its (whitespace-collapsed) label.

use regex::Regex;
use std::sync::OnceLock;

/// (raw label, display name, group)
const CATEGORY_MAP: &[(&str, &str, &str)] = &[
    ("Coffe", "Coffee", "Food & Drink"),
    ("Restuarant", "Restaurant", "Food & Drink"),
    ("Film/enjoyment", "Entertainment", "Leisure"),
];

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedCategory {
    pub key: String,
    pub group: Option<&'static str>,
}

fn whitespace_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("whitespace regex"))
}

/// Trim and collapse runs of whitespace to a single space.
pub fn clean_label(raw: &str) -> String {
    whitespace_re().replace_all(raw.trim(), " ").into_owned()
}

pub fn normalize_category(raw: &str) -> NormalizedCategory {
    let label = clean_label(raw);
    match CATEGORY_MAP.iter().find(|(from, _, _)| *from == label) {
        Some((_, key, group)) => NormalizedCategory {
            key: key.to_string(),
            group: Some(*group),
        },
        None => NormalizedCategory {
            key: label,
            group: None,
        },
    }
}
