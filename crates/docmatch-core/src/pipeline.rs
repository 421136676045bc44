//! Batch orchestration: extract, parse, look up and compare each document.

use std::any::Any;
use std::borrow::Cow;
use std::io::Write;
use std::panic::AssertUnwindSafe;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures_util::{FutureExt, StreamExt, stream};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::compare::compare;
use crate::error::{DocmatchError, ProcessingError};
use crate::extract::Extractor;
use crate::fields::FieldParser;
use crate::models::config::DocmatchConfig;
use crate::models::report::{BatchReport, ComparisonOutcome, DocumentOutcome, DocumentResult};
use crate::reference::{InMemoryStore, ReferenceStore};

/// An uploaded document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    /// Declared filename; empty when the upload carried none.
    pub name: String,
    /// Raw bytes.
    pub data: Vec<u8>,
}

impl Document {
    /// Create a document from a name and bytes.
    pub fn new(name: impl Into<String>, data: impl Into<Vec<u8>>) -> Self {
        Self {
            name: name.into(),
            data: data.into(),
        }
    }

    /// Read a document from disk, named after its file name.
    pub fn from_path(path: &Path) -> std::io::Result<Self> {
        let data = std::fs::read(path)?;
        Ok(Self {
            name: file_name(path),
            data,
        })
    }
}

/// Runs documents through extraction, parsing, lookup and comparison.
pub struct Pipeline {
    extractor: Extractor,
    parser: FieldParser,
    store: Arc<dyn ReferenceStore>,
    spool_dir: Option<PathBuf>,
}

impl Pipeline {
    /// Create a pipeline from an extractor and a reference store.
    pub fn new(extractor: Extractor, store: Arc<dyn ReferenceStore>) -> Self {
        Self {
            extractor,
            parser: FieldParser::new(),
            store,
            spool_dir: None,
        }
    }

    /// Build a pipeline from configuration: OCR.space for images, records
    /// from `reference.records_path` or the built-in sample.
    pub fn from_config(config: &DocmatchConfig) -> crate::Result<Self> {
        let store = InMemoryStore::from_config(&config.reference)?;
        let mut pipeline = Self::new(Extractor::from_config(&config.ocr), Arc::new(store));
        if let Some(dir) = &config.pipeline.spool_dir {
            if !dir.is_dir() {
                return Err(DocmatchError::Config(format!(
                    "spool directory does not exist: {}",
                    dir.display()
                )));
            }
            pipeline = pipeline.with_spool_dir(dir);
        }
        Ok(pipeline)
    }

    /// Stage each document in a temporary file under `dir` while it is
    /// processed.
    pub fn with_spool_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.spool_dir = Some(dir.into());
        self
    }

    /// The reference store used for lookups.
    pub fn store(&self) -> &dyn ReferenceStore {
        self.store.as_ref()
    }

    /// Process a single document.
    ///
    /// Extraction failures and comparison failures are part of the returned
    /// result; only unexpected faults are errors.
    pub async fn process(&self, document: &Document) -> Result<DocumentResult, ProcessingError> {
        let start = Instant::now();

        // Removed on drop, on every exit path.
        let staged = match &self.spool_dir {
            Some(dir) => Some(spool(dir, document)?),
            None => None,
        };
        let data: Cow<'_, [u8]> = match &staged {
            Some(file) => Cow::Owned(std::fs::read(file.path())?),
            None => Cow::Borrowed(&document.data),
        };

        let extraction = self.extractor.extract(&document.name, &data).await;
        let Some(text) = extraction.parseable_text() else {
            debug!("{}: no text to parse ({})", document.name, extraction);
            return Ok(DocumentResult::unparsed(extraction));
        };

        let fields = self.parser.parse(text);
        let comparison = match fields.record_id().filter(|id| !id.is_empty()) {
            None => {
                debug!("{}: no record id in extracted data", document.name);
                ComparisonOutcome::MissingRecordId
            }
            Some(record_id) => {
                let record = self.store.lookup(record_id)?;
                if record.is_none() {
                    debug!("{}: record {:?} not found", document.name, record_id);
                }
                ComparisonOutcome::Compared(compare(&fields, record.as_ref()))
            }
        };

        debug!("{}: processed in {:?}", document.name, start.elapsed());

        Ok(DocumentResult {
            extraction,
            fields: Some(fields),
            comparison,
        })
    }

    /// Process a batch sequentially, in input order.
    ///
    /// A fault in one document is recorded as that document's error and the
    /// batch carries on.
    pub async fn run(&self, documents: Vec<Document>) -> BatchReport {
        let inputs = documents
            .into_iter()
            .map(|document| (document.name.clone(), DocumentSource::Loaded(document)))
            .collect();
        self.run_inputs(inputs).await
    }

    /// Read and process files sequentially, in input order.
    ///
    /// Each file is read only when its turn comes; a file that cannot be
    /// read is recorded as that file's error.
    pub async fn run_files(&self, paths: Vec<PathBuf>) -> BatchReport {
        let inputs = paths
            .into_iter()
            .map(|path| {
                let name = file_name(&path);
                (name, DocumentSource::Path(path))
            })
            .collect();
        self.run_inputs(inputs).await
    }

    async fn run_inputs(&self, inputs: Vec<(String, DocumentSource)>) -> BatchReport {
        if inputs.iter().all(|(name, _)| name.is_empty()) {
            warn!("Batch of {} entries has no usable documents", inputs.len());
            return BatchReport::no_files();
        }

        info!("Processing batch of {} documents", inputs.len());

        let report = stream::iter(inputs)
            .fold(BatchReport::new(), |report, (name, source)| async move {
                if name.is_empty() {
                    let skipped = format!("Skipped empty file input ({})", report.len() + 1);
                    return report.with_entry(skipped, DocumentOutcome::skipped());
                }
                let outcome = match source.load() {
                    Ok(document) => self.process_isolated(&document).await,
                    Err(e) => failed(&name, &ProcessingError::Io(e)),
                };
                report.with_entry(name, outcome)
            })
            .await;

        info!(
            "Batch complete: {} processed, {} failed",
            report.processed_count(),
            report.failed_count()
        );
        report
    }

    async fn process_isolated(&self, document: &Document) -> DocumentOutcome {
        let result = AssertUnwindSafe(self.process(document))
            .catch_unwind()
            .await
            .unwrap_or_else(|panic| Err(ProcessingError::Panicked(panic_message(panic))));

        match result {
            Ok(result) => DocumentOutcome::Processed(result),
            Err(e) => failed(&document.name, &e),
        }
    }
}

/// Where a batch entry's bytes come from.
enum DocumentSource {
    Loaded(Document),
    Path(PathBuf),
}

impl DocumentSource {
    fn load(self) -> std::io::Result<Document> {
        match self {
            DocumentSource::Loaded(document) => Ok(document),
            DocumentSource::Path(path) => Document::from_path(&path),
        }
    }
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default()
}

fn failed(name: &str, error: &ProcessingError) -> DocumentOutcome {
    warn!("Failed to process {}: {}", name, error);
    DocumentOutcome::Failed {
        error: format!("Processing failed for {}: {}", name, error),
    }
}

fn spool(dir: &Path, document: &Document) -> std::io::Result<NamedTempFile> {
    let suffix: String = document
        .name
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' { c } else { '_' })
        .collect();

    let mut file = tempfile::Builder::new()
        .prefix(&format!("{}_", std::process::id()))
        .suffix(&format!("_{}", suffix))
        .tempfile_in(dir)?;
    file.write_all(&document.data)?;
    file.flush()?;

    debug!("Spooled {} to {}", document.name, file.path().display());
    Ok(file)
}

fn panic_message(panic: Box<dyn Any + Send>) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "unexpected panic".to_string()
    }
}
