//! Roster loading: the canonical recipient → client mapping.
//!
//! A roster arrives as a table (CSV/TSV/JSON or a spreadsheet) with a recipient-name column
//! and a client column. `table` parses the raw file into headers + rows,
//! `index` normalizes it into a read-only `RosterIndex` the matcher and
//! splitter query.

pub mod index;
pub mod table;

pub use index::*;
pub use table::*;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RosterError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Roster is missing required column(s): {}", missing.join(", "))]
    InvalidRoster { missing: Vec<String> },

    #[error("Unsupported roster format: {0} (expected .csv, .tsv, .txt, .json, .xlsx, .xls or .ods)")]
    UnsupportedRosterFormat(String),

    #[error("Could not parse roster: {0}")]
    Parse(String),
}

impl From<serde_json::Error> for RosterError {
    fn from(e: serde_json::Error) -> Self {
        Self::Parse(e.to_string())
    }
}
