use std::collections::HashMap;

use super::format::{is_pdf, SourceDocument, MAX_DOCUMENT_BYTES};
use super::hash::compute_content_hash;
use super::IntakeError;

/// Per-batch admission checks. Remembers content hashes of accepted
/// documents so byte-identical repeats are skipped.
#[derive(Debug)]
pub struct IntakeChecker {
    max_bytes: u64,
    seen: HashMap<String, String>,
}

impl Default for IntakeChecker {
    fn default() -> Self {
        Self::new(MAX_DOCUMENT_BYTES)
    }
}

impl IntakeChecker {
    pub fn new(max_bytes: u64) -> Self {
        Self {
            max_bytes,
            seen: HashMap::new(),
        }
    }

    /// Admit a document or say why it is skipped.
    pub fn check(&mut self, doc: &SourceDocument) -> Result<(), IntakeError> {
        let size = doc.size_bytes();
        if size > self.max_bytes {
            return Err(IntakeError::TooLarge {
                size_mb: to_mb(size),
                max_mb: to_mb(self.max_bytes),
            });
        }

        if !is_pdf(&doc.bytes) {
            return Err(IntakeError::NotPdf);
        }

        let hash = compute_content_hash(&doc.bytes);
        if let Some(first) = self.seen.get(&hash) {
            return Err(IntakeError::Duplicate { of: first.clone() });
        }
        self.seen.insert(hash, doc.name.clone());

        Ok(())
    }

    pub fn accepted(&self) -> usize {
        self.seen.len()
    }
}

fn to_mb(bytes: u64) -> f64 {
    bytes as f64 / (1024.0 * 1024.0)
}
