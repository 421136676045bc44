//! DOCX text extraction.
//!
//! Reads `word/document.xml` from the OOXML container and collects the text
//! of body-level paragraphs in document order. Paragraphs nested in tables or
//! text boxes are skipped.

use std::io::{Cursor, Read};

use quick_xml::Reader;
use quick_xml::events::Event;
use tracing::debug;
use zip::ZipArchive;

use crate::error::DocxError;

/// Result type for DOCX operations.
pub type Result<T> = std::result::Result<T, DocxError>;

const DOCUMENT_PART: &str = "word/document.xml";

/// Extract paragraph text joined by newlines, trimmed.
pub fn extract_text(data: &[u8]) -> Result<String> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let mut xml = Vec::new();
    archive.by_name(DOCUMENT_PART)?.read_to_end(&mut xml)?;

    let paragraphs = collect_paragraphs(&xml)?;
    debug!("Read {} paragraphs from {}", paragraphs.len(), DOCUMENT_PART);

    Ok(paragraphs.join("\n").trim().to_string())
}

fn collect_paragraphs(xml: &[u8]) -> Result<Vec<String>> {
    let mut reader = Reader::from_reader(xml);
    reader.config_mut().trim_text(false);

    let mut buf = Vec::new();
    let mut paragraphs = Vec::new();
    let mut current = String::new();
    let mut table_depth = 0usize;
    let mut paragraph_depth = 0usize;
    let mut in_run = false;
    let mut in_text = false;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth += 1,
                b"w:p" if table_depth == 0 => {
                    paragraph_depth += 1;
                    if paragraph_depth == 1 {
                        current.clear();
                    }
                }
                b"w:r" => in_run = true,
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => {
                let collecting = table_depth == 0 && paragraph_depth == 1 && in_run;
                match e.name().as_ref() {
                    b"w:p" if table_depth == 0 && paragraph_depth == 0 => {
                        paragraphs.push(String::new())
                    }
                    b"w:tab" if collecting => current.push('\t'),
                    b"w:br" | b"w:cr" if collecting => current.push('\n'),
                    _ => {}
                }
            }
            Event::Text(t) if in_text && table_depth == 0 && paragraph_depth == 1 => {
                current.push_str(&t.unescape()?);
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:tbl" => table_depth = table_depth.saturating_sub(1),
                b"w:p" if table_depth == 0 && paragraph_depth > 0 => {
                    if paragraph_depth == 1 {
                        paragraphs.push(std::mem::take(&mut current));
                    }
                    paragraph_depth -= 1;
                }
                b"w:r" => in_run = false,
                b"w:t" => in_text = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(paragraphs)
}
