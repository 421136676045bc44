//! Data models shared across the pipeline.

pub mod config;
pub mod record;
pub mod report;

pub use config::DocmatchConfig;
pub use record::{Field, FieldSet, ReferenceRecord};
pub use report::{BatchReport, ComparisonOutcome, DocumentOutcome, DocumentResult, ReportEntry};
