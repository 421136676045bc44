//! Text extraction from uploaded documents.
//!
//! Documents are routed by filename extension to one of three backends:
//! images go to an OCR service, PDFs and DOCX files are decoded locally.
//! Backend failures never escape as errors; they are reported through
//! [`Extraction::Failed`].

pub mod docx;
pub mod ocr;
pub mod pdf;

use std::fmt;
use std::sync::Arc;

use serde::{Serialize, Serializer};
use tracing::{debug, info};

use crate::error::ExtractionFailure;
use crate::models::config::OcrConfig;
use ocr::{OcrBackend, OcrSpaceClient};

/// Image extensions handled by the OCR backend.
pub const IMAGE_EXTENSIONS: [&str; 6] = ["png", "jpg", "jpeg", "bmp", "gif", "tiff"];

/// Backend selected for a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Image,
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Select a backend from a lowercased extension.
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension {
            ext if IMAGE_EXTENSIONS.contains(&ext) => Some(DocumentKind::Image),
            "pdf" => Some(DocumentKind::Pdf),
            "docx" => Some(DocumentKind::Docx),
            _ => None,
        }
    }

    /// Select a backend from a filename.
    pub fn from_filename(filename: &str) -> Option<Self> {
        Self::from_extension(&extension(filename))
    }
}

/// Lowercased text after the last `.`, or empty when there is none.
pub fn extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_lowercase())
        .unwrap_or_default()
}

/// Outcome of extracting text from one document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Extraction {
    /// Extracted text, trimmed.
    Text(String),
    /// The OCR service returned no result for the image.
    NoText,
    /// The extension maps to no backend.
    Unsupported { extension: String },
    /// A backend failed.
    Failed(ExtractionFailure),
}

impl Extraction {
    /// Text produced by a backend.
    pub fn text(&self) -> Option<&str> {
        match self {
            Extraction::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Text that field parsing should run on, if any.
    ///
    /// Empty backend text is not parsed. An image the OCR service found no
    /// text in still parses (as empty text), so it ends up reported as
    /// missing its record id.
    pub fn parseable_text(&self) -> Option<&str> {
        match self {
            Extraction::NoText => Some(""),
            _ => self.text().filter(|text| !text.is_empty()),
        }
    }

    /// The failure, if a backend failed.
    pub fn failure(&self) -> Option<&ExtractionFailure> {
        match self {
            Extraction::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

impl fmt::Display for Extraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Extraction::Text(text) => f.write_str(text),
            Extraction::NoText => f.write_str("No text found in image."),
            Extraction::Unsupported { .. } => f.write_str("Unsupported file format."),
            Extraction::Failed(failure) => write!(f, "{}", failure),
        }
    }
}

impl Serialize for Extraction {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Routes documents to extraction backends.
#[derive(Clone)]
pub struct Extractor {
    ocr: Arc<dyn OcrBackend>,
}

impl Extractor {
    /// Create an extractor using the given OCR backend for images.
    pub fn new(ocr: Arc<dyn OcrBackend>) -> Self {
        Self { ocr }
    }

    /// Create an extractor backed by the OCR.space client.
    pub fn from_config(config: &OcrConfig) -> Self {
        Self::new(Arc::new(OcrSpaceClient::new(config)))
    }

    /// Extract text from a document.
    pub async fn extract(&self, filename: &str, data: &[u8]) -> Extraction {
        let Some(kind) = DocumentKind::from_filename(filename) else {
            let extension = extension(filename);
            info!("Unsupported file format for {}: {:?}", filename, extension);
            return Extraction::Unsupported { extension };
        };

        debug!("Extracting {} as {:?}", filename, kind);

        match kind {
            DocumentKind::Image => match self.ocr.recognize(filename, data.to_vec()).await {
                Ok(Some(text)) => Extraction::Text(text.trim().to_string()),
                Ok(None) => Extraction::NoText,
                Err(failure) => Extraction::Failed(failure),
            },
            DocumentKind::Pdf => match pdf::extract_text(data) {
                Ok(text) => Extraction::Text(text),
                Err(e) => Extraction::Failed(ExtractionFailure::Pdf(e.to_string())),
            },
            DocumentKind::Docx => match docx::extract_text(data) {
                Ok(text) => Extraction::Text(text),
                Err(e) => Extraction::Failed(ExtractionFailure::Docx(e.to_string())),
            },
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use async_trait::async_trait;
    use ocr::OcrOutcome;
    use pretty_assertions::assert_eq;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// OCR backend returning a fixed outcome and counting calls.
    pub(crate) struct FixedOcr {
        pub outcome: OcrOutcome,
        pub calls: AtomicUsize,
    }

    impl FixedOcr {
        pub(crate) fn new(outcome: OcrOutcome) -> Arc<Self> {
            Arc::new(Self {
                outcome,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl OcrBackend for FixedOcr {
        async fn recognize(&self, _filename: &str, _image: Vec<u8>) -> OcrOutcome {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.outcome.clone()
        }
    }

    #[test]
    fn test_routing_by_extension() {
        for name in ["a.png", "a.JPG", "b.jpeg", "c.Bmp", "d.gif", "e.TIFF"] {
            assert_eq!(DocumentKind::from_filename(name), Some(DocumentKind::Image), "{name}");
        }
        assert_eq!(DocumentKind::from_filename("scan.PDF"), Some(DocumentKind::Pdf));
        assert_eq!(DocumentKind::from_filename("form.docx"), Some(DocumentKind::Docx));
        assert_eq!(DocumentKind::from_filename("form.doc"), None);
        assert_eq!(DocumentKind::from_filename("archive.tar.gz"), None);
        assert_eq!(DocumentKind::from_filename("README"), None);
    }

    #[test]
    fn test_extension() {
        assert_eq!(extension("Report.Final.PDF"), "pdf");
        assert_eq!(extension("noext"), "");
        assert_eq!(extension("trailing."), "");
    }

    #[tokio::test]
    async fn test_unsupported_never_calls_backend() {
        let ocr = FixedOcr::new(Ok(Some("text".to_string())));
        let extractor = Extractor::new(ocr.clone());

        let result = extractor.extract("notes.txt", b"Name: x").await;

        assert_eq!(result, Extraction::Unsupported { extension: "txt".to_string() });
        assert_eq!(result.to_string(), "Unsupported file format.");
        assert_eq!(result.parseable_text(), None);
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_image_goes_to_ocr() {
        let ocr = FixedOcr::new(Ok(Some("  Name: Raj Patel \n".to_string())));
        let extractor = Extractor::new(ocr.clone());

        let result = extractor.extract("id.PNG", b"\x89PNG").await;

        assert_eq!(result, Extraction::Text("Name: Raj Patel".to_string()));
        assert_eq!(ocr.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_image_without_text() {
        let extractor = Extractor::new(FixedOcr::new(Ok(None)));
        let result = extractor.extract("blank.jpg", b"").await;

        assert_eq!(result, Extraction::NoText);
        assert_eq!(result.to_string(), "No text found in image.");
        assert_eq!(result.parseable_text(), Some(""));
    }

    #[tokio::test]
    async fn test_ocr_failure_is_tagged() {
        let failure = ExtractionFailure::Connectivity("connection refused".to_string());
        let extractor = Extractor::new(FixedOcr::new(Err(failure.clone())));

        let result = extractor.extract("scan.gif", b"GIF89a").await;

        assert_eq!(result.failure(), Some(&failure));
        assert_eq!(
            result.to_string(),
            "Error connecting to OCR Space API: connection refused"
        );
    }

    #[tokio::test]
    async fn test_docx_backend() {
        let extractor = Extractor::new(FixedOcr::new(Ok(None)));
        let data = docx::tests::paragraphs_docx(&["Sr no.: S003", "Name: Sarah Johnson"]);

        let result = extractor.extract("form.DOCX", &data).await;
        assert_eq!(result, Extraction::Text("Sr no.: S003\nName: Sarah Johnson".to_string()));
    }

    #[tokio::test]
    async fn test_empty_docx_text_is_not_parseable() {
        let extractor = Extractor::new(FixedOcr::new(Ok(None)));
        let data = docx::tests::sample_docx("<w:p/><w:p><w:r><w:t>  </w:t></w:r></w:p>");

        let result = extractor.extract("blank.docx", &data).await;
        assert_eq!(result, Extraction::Text(String::new()));
        assert_eq!(result.text(), Some(""));
        assert_eq!(result.parseable_text(), None);
    }

    #[tokio::test]
    async fn test_malformed_pdf_is_tagged() {
        let extractor = Extractor::new(FixedOcr::new(Ok(None)));
        let result = extractor.extract("broken.pdf", b"%PDF-1.4 garbage").await;

        assert!(matches!(result, Extraction::Failed(ExtractionFailure::Pdf(_))));
        assert!(result.to_string().starts_with("Error extracting text from PDF: "));
    }

    #[tokio::test]
    async fn test_malformed_docx_is_tagged() {
        let extractor = Extractor::new(FixedOcr::new(Ok(None)));
        let result = extractor.extract("broken.docx", b"PK garbage").await;

        assert!(matches!(result, Extraction::Failed(ExtractionFailure::Docx(_))));
        assert!(result.to_string().starts_with("Error extracting text from DOCX: "));
    }
}
