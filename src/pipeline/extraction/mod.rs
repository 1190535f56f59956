pub mod types;
pub mod pdf;
pub mod name;

pub use types::*;
pub use pdf::*;
pub use name::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ExtractionError {
    #[error("PDF parsing failed: {0}")]
    PdfParsing(String),

    #[error("PDF is encrypted or password-protected")]
    Encrypted,

    #[error("Page text extraction failed: {0}")]
    PageTextExtraction(String),

    #[error("Page {page} out of range (document has {total} pages)")]
    PageOutOfRange { page: usize, total: usize },

    #[error("Could not write single-page PDF: {0}")]
    PageWrite(String),

    #[error("Invalid extraction pattern: {0}")]
    InvalidPattern(String),
}
