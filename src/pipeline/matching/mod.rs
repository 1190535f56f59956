//! Fuzzy reconciliation of extracted names against the roster.

pub mod matcher;
pub mod similarity;

pub use matcher::*;
pub use similarity::*;

use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
pub enum MatchError {
    #[error("Match threshold must be within [0, 1], got {0}")]
    InvalidThreshold(f64),
}
