//! Certificate splitting: one output PDF per page whose recipient matches
//! the roster, named `{client}_{name}_{date}_{seq}.pdf`.

pub mod naming;
pub mod split;
pub mod types;

pub use naming::*;
pub use split::*;
pub use types::*;

use thiserror::Error;

use crate::pipeline::extraction::ExtractionError;

#[derive(Error, Debug)]
pub enum SplitError {
    #[error("Extraction error: {0}")]
    Extraction(#[from] ExtractionError),

    #[error("Split cancelled")]
    Cancelled,
}
