//! Per-document results and the batch report.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};

use crate::compare::{ComparisonError, ComparisonResult, Mismatch};
use crate::extract::Extraction;
use crate::models::record::{Field, FieldSet};

/// Batch-level error when nothing usable was submitted.
pub const NO_FILES_SELECTED: &str = "No files selected.";

/// Per-document error for an entry without a filename.
pub const SKIPPED_EMPTY_INPUT: &str = "Skipped empty file input.";

/// How far comparison got for a document.
#[derive(Debug, Clone, PartialEq)]
pub enum ComparisonOutcome {
    /// Extraction produced no text to parse.
    NotAttempted,
    /// The parsed fields carry no record id.
    MissingRecordId,
    /// Lookup ran and the fields were scored.
    Compared(ComparisonResult),
}

/// Full result bundle for a processed document.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentResult {
    /// Extraction outcome; its display form is the extracted text.
    pub extraction: Extraction,
    /// Parsed fields, `None` when extraction produced no text.
    pub fields: Option<FieldSet>,
    /// Comparison outcome.
    pub comparison: ComparisonOutcome,
}

impl DocumentResult {
    /// Result for a document whose extraction yielded nothing to parse.
    pub fn unparsed(extraction: Extraction) -> Self {
        Self {
            extraction,
            fields: None,
            comparison: ComparisonOutcome::NotAttempted,
        }
    }

    /// Accuracy, defined only when a comparison ran.
    pub fn accuracy(&self) -> Option<f64> {
        match &self.comparison {
            ComparisonOutcome::Compared(result) => Some(result.accuracy),
            _ => None,
        }
    }

    /// Mismatched fields, empty unless a comparison ran.
    pub fn mismatches(&self) -> Option<&BTreeMap<Field, Mismatch>> {
        match &self.comparison {
            ComparisonOutcome::Compared(result) => Some(&result.mismatches),
            _ => None,
        }
    }

    /// Soft comparison error, if any.
    pub fn comparison_error(&self) -> Option<ComparisonError> {
        match &self.comparison {
            ComparisonOutcome::NotAttempted => None,
            ComparisonOutcome::MissingRecordId => Some(ComparisonError::MissingRecordId),
            ComparisonOutcome::Compared(result) => result.error,
        }
    }
}

struct MismatchMap<'a>(Option<&'a BTreeMap<Field, Mismatch>>);

impl Serialize for MismatchMap<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.0.into_iter().flatten();
        serializer.collect_map(entries.map(|(f, m)| (f.label(), m)))
    }
}

impl Serialize for DocumentResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(5))?;
        map.serialize_entry("extracted_text", &self.extraction)?;
        map.serialize_entry("structured_data", &self.fields)?;
        map.serialize_entry("accuracy", &self.accuracy())?;
        map.serialize_entry("mismatched_fields", &MismatchMap(self.mismatches()))?;
        map.serialize_entry("comparison_error", &self.comparison_error())?;
        map.end()
    }
}

/// Outcome recorded for one report entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum DocumentOutcome {
    /// The document could not be processed.
    Failed { error: String },
    /// The document went through the pipeline.
    Processed(DocumentResult),
}

impl DocumentOutcome {
    /// Outcome for an entry without a filename.
    pub fn skipped() -> Self {
        DocumentOutcome::Failed {
            error: SKIPPED_EMPTY_INPUT.to_string(),
        }
    }

    /// The result bundle, if the document was processed.
    pub fn result(&self) -> Option<&DocumentResult> {
        match self {
            DocumentOutcome::Processed(result) => Some(result),
            DocumentOutcome::Failed { .. } => None,
        }
    }

    /// The error, if the document failed.
    pub fn error(&self) -> Option<&str> {
        match self {
            DocumentOutcome::Failed { error } => Some(error),
            DocumentOutcome::Processed(_) => None,
        }
    }
}

/// A named entry of the batch report.
#[derive(Debug, Clone, PartialEq)]
pub struct ReportEntry {
    pub name: String,
    pub outcome: DocumentOutcome,
}

/// Ordered results of one batch, keyed by document name.
#[derive(Debug, Clone)]
pub struct BatchReport {
    processed_at: DateTime<Utc>,
    error: Option<String>,
    entries: Vec<ReportEntry>,
}

impl BatchReport {
    /// Create an empty report.
    pub fn new() -> Self {
        Self {
            processed_at: Utc::now(),
            error: None,
            entries: Vec::new(),
        }
    }

    /// Report for a batch with nothing usable in it.
    pub fn no_files() -> Self {
        Self {
            error: Some(NO_FILES_SELECTED.to_string()),
            ..Self::new()
        }
    }

    /// Add an entry. A name already present keeps its position and takes
    /// the new outcome.
    pub fn with_entry(mut self, name: impl Into<String>, outcome: DocumentOutcome) -> Self {
        let name = name.into();
        match self.entries.iter_mut().find(|e| e.name == name) {
            Some(existing) => existing.outcome = outcome,
            None => self.entries.push(ReportEntry { name, outcome }),
        }
        self
    }

    /// When the batch started.
    pub fn processed_at(&self) -> DateTime<Utc> {
        self.processed_at
    }

    /// Batch-level error.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Entries in input order.
    pub fn entries(&self) -> &[ReportEntry] {
        &self.entries
    }

    /// Outcome recorded under `name`.
    pub fn get(&self, name: &str) -> Option<&DocumentOutcome> {
        self.entries
            .iter()
            .find(|e| e.name == name)
            .map(|e| &e.outcome)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the report has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Number of entries that went through the pipeline.
    pub fn processed_count(&self) -> usize {
        self.entries
            .iter()
            .filter(|e| e.outcome.result().is_some())
            .count()
    }

    /// Number of entries recorded as errors.
    pub fn failed_count(&self) -> usize {
        self.len() - self.processed_count()
    }
}

impl Default for BatchReport {
    fn default() -> Self {
        Self::new()
    }
}

struct Entries<'a>(&'a [ReportEntry]);

impl Serialize for Entries<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_map(self.0.iter().map(|e| (&e.name, &e.outcome)))
    }
}

impl Serialize for BatchReport {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = if self.error.is_some() { 3 } else { 2 };
        let mut map = serializer.serialize_map(Some(len))?;
        map.serialize_entry("processed_at", &self.processed_at)?;
        if let Some(error) = &self.error {
            map.serialize_entry("error", error)?;
        }
        map.serialize_entry("results", &Entries(&self.entries))?;
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compare::compare;
    use crate::models::record::ReferenceRecord;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn processed(comparison: ComparisonOutcome) -> DocumentOutcome {
        DocumentOutcome::Processed(DocumentResult {
            extraction: Extraction::Text("Age: 24".to_string()),
            fields: Some([(Field::Age, "24".to_string())].into_iter().collect()),
            comparison,
        })
    }

    #[test]
    fn test_duplicate_name_replaces_in_place() {
        let report = BatchReport::new()
            .with_entry("a.png", DocumentOutcome::skipped())
            .with_entry("b.png", DocumentOutcome::skipped())
            .with_entry("a.png", processed(ComparisonOutcome::MissingRecordId));

        let names: Vec<&str> = report.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["a.png", "b.png"]);
        assert!(report.get("a.png").unwrap().result().is_some());
        assert_eq!(report.processed_count(), 1);
        assert_eq!(report.failed_count(), 1);
    }

    #[test]
    fn test_unparsed_result_accessors() {
        let result = DocumentResult::unparsed(Extraction::Unsupported {
            extension: "txt".to_string(),
        });
        assert_eq!(result.accuracy(), None);
        assert_eq!(result.comparison_error(), None);
        assert!(result.fields.is_none());
    }

    #[test]
    fn test_document_result_json() {
        let reference = ReferenceRecord::new().with(Field::Age, "23");
        let fields: FieldSet = [(Field::Age, "24".to_string())].into_iter().collect();
        let outcome = processed(ComparisonOutcome::Compared(compare(&fields, Some(&reference))));

        let value = serde_json::to_value(&outcome).unwrap();
        assert_eq!(value["extracted_text"], json!("Age: 24"));
        assert_eq!(value["structured_data"]["Age"], json!("24"));
        assert_eq!(value["structured_data"]["Name"], json!(null));
        assert_eq!(value["accuracy"], json!(0.0));
        assert_eq!(
            value["mismatched_fields"],
            json!({"Age": {"reference": "23", "parsed": "24"}})
        );
        assert_eq!(value["comparison_error"], json!(null));
    }

    #[test]
    fn test_missing_id_json() {
        let value = serde_json::to_value(processed(ComparisonOutcome::MissingRecordId)).unwrap();
        assert_eq!(value["accuracy"], json!(null));
        assert_eq!(value["mismatched_fields"], json!({}));
        assert_eq!(
            value["comparison_error"],
            json!("Sr no. not found in extracted data, cannot compare.")
        );
    }

    #[test]
    fn test_report_json() {
        let report = BatchReport::new().with_entry("x.docx", DocumentOutcome::skipped());
        let value = serde_json::to_value(&report).unwrap();

        assert!(value.get("error").is_none());
        assert_eq!(
            value["results"],
            json!({"x.docx": {"error": "Skipped empty file input."}})
        );

        let value = serde_json::to_value(BatchReport::no_files()).unwrap();
        assert_eq!(value["error"], json!("No files selected."));
        assert_eq!(value["results"], json!({}));
    }
}
