//! Error types for the docmatch-core library.

use thiserror::Error;

/// Main error type for the docmatch library.
#[derive(Error, Debug)]
pub enum DocmatchError {
    /// Reference store error.
    #[error("reference store error: {0}")]
    Store(#[from] StoreError),

    /// Per-document processing fault.
    #[error("processing error: {0}")]
    Processing(#[from] ProcessingError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Reasons a text extraction backend could not produce text.
///
/// The `Display` form is the marker text shown to users in place of the
/// extracted text.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ExtractionFailure {
    /// The OCR service could not be reached or answered with an HTTP error.
    #[error("Error connecting to OCR Space API: {0}")]
    Connectivity(String),

    /// The OCR service reported a processing fault.
    #[error("OCR Space API Error: {0}")]
    OcrService(String),

    /// The OCR response could not be interpreted.
    #[error("Error during OCR processing: {0}")]
    Ocr(String),

    /// The PDF decoder failed.
    #[error("Error extracting text from PDF: {0}")]
    Pdf(String),

    /// The DOCX decoder failed.
    #[error("Error extracting text from DOCX: {0}")]
    Docx(String),
}

/// Errors related to PDF decoding.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The text extractor panicked on a malformed document.
    #[error("text extractor panicked on malformed PDF")]
    Panicked,
}

/// Errors related to DOCX decoding.
#[derive(Error, Debug)]
pub enum DocxError {
    /// The container is not a readable zip archive.
    #[error("invalid archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// The document part is not well-formed XML.
    #[error("invalid document XML: {0}")]
    Xml(#[from] quick_xml::Error),

    /// Reading a part of the archive failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised by reference stores.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Reading the backing file failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The backing data is malformed.
    #[error("invalid reference data: {0}")]
    Parse(String),

    /// The backing store is unavailable.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

impl From<serde_json::Error> for StoreError {
    fn from(e: serde_json::Error) -> Self {
        StoreError::Parse(e.to_string())
    }
}

/// Unexpected faults while processing a single document.
#[derive(Error, Debug)]
pub enum ProcessingError {
    /// Spooling the document to disk failed.
    #[error("{0}")]
    Io(#[from] std::io::Error),

    /// The reference store failed.
    #[error("{0}")]
    Store(#[from] StoreError),

    /// A backend panicked.
    #[error("{0}")]
    Panicked(String),
}

/// Result type for the docmatch library.
pub type Result<T> = std::result::Result<T, DocmatchError>;
