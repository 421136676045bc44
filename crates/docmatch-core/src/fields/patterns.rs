//! Label patterns for line-oriented field extraction.

use lazy_static::lazy_static;
use regex::Regex;

use crate::models::record::Field;

/// Build the pattern matching `<label>: <value>` at the start of a line.
///
/// The label is matched literally and case-insensitively; the value is
/// captured in group 1.
pub fn label_pattern(label: &str) -> Regex {
    Regex::new(&format!(r"(?i)^\s*{}\s*:\s*(.*)", regex::escape(label)))
        .expect("escaped label always forms a valid pattern")
}

lazy_static! {
    /// One compiled pattern per vocabulary field, in declared order.
    pub static ref FIELD_PATTERNS: Vec<(Field, Regex)> = Field::ALL
        .into_iter()
        .map(|field| (field, label_pattern(field.label())))
        .collect();
}
