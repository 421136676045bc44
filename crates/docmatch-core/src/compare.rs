//! Scoring parsed fields against a reference record.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Serialize, Serializer};
use tracing::debug;

use crate::models::record::{Field, FieldSet, ReferenceRecord};

/// Soft comparison failures recorded alongside a document result.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonError {
    /// The document carried no record id, so no lookup was attempted.
    MissingRecordId,
    /// The record id is not present in the reference store.
    RecordNotFound,
}

impl ComparisonError {
    pub fn message(&self) -> &'static str {
        match self {
            ComparisonError::MissingRecordId => {
                "Sr no. not found in extracted data, cannot compare."
            }
            ComparisonError::RecordNotFound => "Sr no. not found in database.",
        }
    }
}

impl fmt::Display for ComparisonError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for ComparisonError {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// A field whose parsed value disagrees with the reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    /// Value held by the reference record.
    pub reference: String,
    /// Value parsed from the document, `None` when the label was missing.
    pub parsed: Option<String>,
}

/// Outcome of comparing one field set against a reference record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparisonResult {
    /// Percentage of reference fields matched, in `[0, 100]`.
    pub accuracy: f64,
    /// Mismatched fields in declared order.
    #[serde(serialize_with = "serialize_mismatches")]
    pub mismatches: BTreeMap<Field, Mismatch>,
    /// Set when no reference record was available.
    pub error: Option<ComparisonError>,
}

impl ComparisonResult {
    /// Result for a record id the store does not know.
    pub fn not_found() -> Self {
        Self {
            accuracy: 0.0,
            mismatches: BTreeMap::new(),
            error: Some(ComparisonError::RecordNotFound),
        }
    }

    /// Whether every reference field matched.
    pub fn is_exact(&self) -> bool {
        self.error.is_none() && self.mismatches.is_empty()
    }
}

fn serialize_mismatches<S: Serializer>(
    mismatches: &BTreeMap<Field, Mismatch>,
    serializer: S,
) -> Result<S::Ok, S::Error> {
    serializer.collect_map(mismatches.iter().map(|(f, m)| (f.label(), m)))
}

/// Compare parsed fields with a reference record.
///
/// The reference record's fields define what is scored: parsed fields the
/// record does not hold are ignored. Values match when both are present and
/// equal after lowercasing.
pub fn compare(fields: &FieldSet, reference: Option<&ReferenceRecord>) -> ComparisonResult {
    let Some(reference) = reference else {
        return ComparisonResult::not_found();
    };

    let mut matched = 0usize;
    let mut mismatches = BTreeMap::new();

    for (field, expected) in reference.iter() {
        let parsed = fields.get(field);
        match parsed {
            Some(value) if value.to_lowercase() == expected.to_lowercase() => matched += 1,
            _ => {
                mismatches.insert(
                    field,
                    Mismatch {
                        reference: expected.to_string(),
                        parsed: parsed.map(str::to_string),
                    },
                );
            }
        }
    }

    let total = reference.len();
    let accuracy = if total > 0 {
        matched as f64 / total as f64 * 100.0
    } else {
        0.0
    };

    debug!(
        "Compared {} reference fields: {} matched, {} mismatched ({:.2}%)",
        total,
        matched,
        mismatches.len(),
        accuracy
    );

    ComparisonResult {
        accuracy,
        mismatches,
        error: None,
    }
}
