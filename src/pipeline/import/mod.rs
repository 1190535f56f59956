pub mod format;
pub mod hash;
pub mod intake;

pub use format::*;
pub use hash::*;
pub use intake::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum IntakeError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Not a PDF document (missing %PDF header)")]
    NotPdf,

    #[error("File too large: {size_mb:.1}MB exceeds {max_mb:.1}MB limit")]
    TooLarge { size_mb: f64, max_mb: f64 },

    #[error("Duplicate of {of} in this batch")]
    Duplicate { of: String },
}
