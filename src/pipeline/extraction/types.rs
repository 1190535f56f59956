use serde::{Deserialize, Serialize};

use super::ExtractionError;

/// A name pulled from one page, before reconciliation against the roster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub raw_text: String,
    pub extracted_name: String,
}

/// Opens raw PDF bytes as a paged document (allows mocking in tests).
pub trait DocumentReader: Send + Sync {
    fn open(&self, pdf_bytes: &[u8]) -> Result<Box<dyn PagedDocument>, ExtractionError>;
}

/// A loaded multi-page document. Pages are 1-based.
pub trait PagedDocument {
    fn page_count(&self) -> usize;

    /// Extracted text of one page. May be empty for image-only pages.
    fn page_text(&self, page: usize) -> Result<&str, ExtractionError>;

    /// A standalone single-page PDF holding exactly this page.
    fn page_bytes(&self, page: usize) -> Result<Vec<u8>, ExtractionError>;
}

/// Pulls the recipient's name out of a page's text.
pub trait NameExtractor: Send + Sync {
    /// `None` when the page has no recognizable recipient.
    fn extract(&self, page_text: &str) -> Option<String>;
}

pub(crate) fn check_page(page: usize, total: usize) -> Result<usize, ExtractionError> {
    if page == 0 || page > total {
        return Err(ExtractionError::PageOutOfRange { page, total });
    }
    Ok(page - 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn traits_are_object_safe() {
        fn _reader(_: &dyn DocumentReader) {}
        fn _doc(_: &dyn PagedDocument) {}
        fn _name(_: &dyn NameExtractor) {}
    }

    #[test]
    fn page_bounds_are_one_based() {
        assert_eq!(check_page(1, 3).unwrap(), 0);
        assert_eq!(check_page(3, 3).unwrap(), 2);
        assert!(matches!(
            check_page(0, 3),
            Err(ExtractionError::PageOutOfRange { page: 0, total: 3 })
        ));
        assert!(check_page(4, 3).is_err());
    }
}
