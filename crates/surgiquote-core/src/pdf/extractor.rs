//! PDF text extraction using lopdf and pdf-extract.

use lopdf::Document;
use std::panic;
use tracing::{debug, warn};

use super::{PdfProcessor, Result};
use crate::error::PdfError;

/// PDF text extractor using lopdf.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
        }
    }

    /// Page-by-page text through lopdf's own content-stream decoder.
    fn extract_text_by_pages(&self) -> Result<String> {
        let doc = self
            .document
            .as_ref()
            .ok_or(PdfError::Parse("No document loaded".to_string()))?;

        let mut pages = Vec::new();
        for page_num in doc.get_pages().keys() {
            match doc.extract_text(&[*page_num]) {
                Ok(text) => pages.push(text),
                Err(e) => debug!("Skipping page {}: {}", page_num, e),
            }
        }

        if pages.is_empty() {
            return Err(PdfError::TextExtraction(
                "no page yielded text".to_string(),
            ));
        }

        Ok(pages.join("\n"))
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf_extract needs the decrypted bytes
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn extract_text(&self) -> Result<String> {
        if self.document.is_none() {
            return Err(PdfError::Parse("No document loaded".to_string()));
        }

        // pdf-extract panics on some malformed font tables
        let raw = &self.raw_data;
        let extracted = panic::catch_unwind(|| pdf_extract::extract_text_from_mem(raw));

        match extracted {
            Ok(Ok(text)) => Ok(text),
            Ok(Err(e)) => {
                debug!("pdf-extract failed ({}), falling back to lopdf", e);
                self.extract_text_by_pages()
            }
            Err(_) => {
                debug!("pdf-extract panicked, falling back to lopdf");
                self.extract_text_by_pages()
            }
        }
    }
}

/// Turn a PDF document into text.
///
/// Any failure yields an empty string, which callers treat as
/// "nothing to extract".
pub fn extract_document_text(data: &[u8]) -> String {
    let mut extractor = PdfExtractor::new();

    if let Err(e) = extractor.load(data) {
        warn!("Could not load PDF: {}", e);
        return String::new();
    }

    match extractor.extract_text() {
        Ok(text) => {
            debug!(
                "Extracted {} characters from {} pages",
                text.len(),
                extractor.page_count()
            );
            text
        }
        Err(e) => {
            warn!("Could not extract text from PDF: {}", e);
            String::new()
        }
    }
}
