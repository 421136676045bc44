//! Core library for document field verification.
//!
//! This crate provides:
//! - Text extraction from images (OCR.space), PDF and DOCX documents
//! - Labelled field parsing ("Sr no.", Name, City, Age, Country, Address)
//! - Reference record lookup and per-field accuracy scoring
//! - A batch pipeline that isolates per-document faults

pub mod error;
pub mod models;
pub mod extract;
pub mod fields;
pub mod reference;
pub mod compare;
pub mod pipeline;

pub use error::{DocmatchError, ExtractionFailure, Result};
pub use models::{
    BatchReport, ComparisonOutcome, DocmatchConfig, DocumentOutcome, DocumentResult, Field,
    FieldSet, ReferenceRecord, ReportEntry,
};
pub use extract::{Extraction, Extractor};
pub use fields::FieldParser;
pub use reference::{InMemoryStore, ReferenceStore};
pub use compare::{compare, ComparisonError, ComparisonResult, Mismatch};
pub use pipeline::{Document, Pipeline};
