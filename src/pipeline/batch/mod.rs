//! Batch runner: drives a set of documents through intake and the
//! splitter, collecting certificates and a run report.
//!
//! Documents are processed strictly in order. A document that fails or is
//! skipped is recorded in the report and the batch moves on; only
//! cancellation stops a run early.

pub mod error;
pub mod runner;
pub mod types;

pub use error::BatchError;
pub use runner::run_batch;
pub use types::*;
