use std::panic::{catch_unwind, AssertUnwindSafe};

use lopdf::Document;

use super::types::{check_page, DocumentReader, PagedDocument};
use super::ExtractionError;

/// PDF reader backed by lopdf (structure, page split) and pdf-extract (text).
/// Handles digital PDFs with embedded text layers.
pub struct LopdfReader;

impl DocumentReader for LopdfReader {
    fn open(&self, pdf_bytes: &[u8]) -> Result<Box<dyn PagedDocument>, ExtractionError> {
        Ok(Box::new(LopdfDocument::load(pdf_bytes)?))
    }
}

/// A parsed PDF with its per-page text extracted up front.
pub struct LopdfDocument {
    document: Document,
    page_texts: Vec<String>,
}

impl LopdfDocument {
    pub fn load(pdf_bytes: &[u8]) -> Result<Self, ExtractionError> {
        let document = Document::load_mem(pdf_bytes).map_err(|e| classify_load_error(&e))?;

        if document.is_encrypted() {
            return Err(ExtractionError::Encrypted);
        }

        let page_count = document.get_pages().len();

        let mut page_texts = extract_page_texts(pdf_bytes)?;

        if page_texts.len() != page_count {
            tracing::debug!(
                pages = page_count,
                extracted = page_texts.len(),
                "Text extractor page count differs from document structure"
            );
        }
        page_texts.resize(page_count, String::new());

        Ok(Self {
            document,
            page_texts,
        })
    }
}

impl PagedDocument for LopdfDocument {
    fn page_count(&self) -> usize {
        self.page_texts.len()
    }

    fn page_text(&self, page: usize) -> Result<&str, ExtractionError> {
        let index = check_page(page, self.page_count())?;
        Ok(&self.page_texts[index])
    }

    fn page_bytes(&self, page: usize) -> Result<Vec<u8>, ExtractionError> {
        let total = self.page_count();
        check_page(page, total)?;

        let others: Vec<u32> = (1..=total as u32)
            .filter(|&n| n as usize != page)
            .collect();

        let mut single = self.document.clone();
        single.delete_pages(&others);
        single.prune_objects();

        let mut buf = Vec::new();
        single
            .save_to(&mut buf)
            .map_err(|e| ExtractionError::PageWrite(e.to_string()))?;
        Ok(buf)
    }
}

/// pdf-extract panics on some structurally valid PDFs (unknown encodings,
/// missing fonts). A panic fails this document only.
fn extract_page_texts(pdf_bytes: &[u8]) -> Result<Vec<String>, ExtractionError> {
    match catch_unwind(AssertUnwindSafe(|| {
        pdf_extract::extract_text_from_mem_by_pages(pdf_bytes)
    })) {
        Ok(Ok(pages)) => Ok(pages),
        Ok(Err(e)) => Err(ExtractionError::PageTextExtraction(e.to_string())),
        Err(payload) => {
            let reason = panic_message(payload.as_ref());
            tracing::warn!(reason = %reason, "Text extractor panicked");
            Err(ExtractionError::PageTextExtraction(format!(
                "text extractor panicked: {reason}"
            )))
        }
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// lopdf reports failed decryption as a load error rather than a flag.
fn classify_load_error(e: &lopdf::Error) -> ExtractionError {
    let msg = e.to_string();
    let lower = msg.to_lowercase();
    if lower.contains("crypt") || lower.contains("password") {
        ExtractionError::Encrypted
    } else {
        ExtractionError::PdfParsing(msg)
    }
}
