use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::pipeline::splitter::{OutputCertificate, SplitEvent};

/// Summary of one batch run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BatchReport {
    pub run_id: Uuid,
    pub started_at: NaiveDateTime,
    pub documents_total: u32,
    pub documents_processed: u32,
    pub documents_failed: u32,
    pub documents_skipped: u32,
    pub pages_scanned: u32,
    pub certificates_produced: u32,
    pub unmatched_names: u32,
    pub duration_ms: u64,
    pub errors: Vec<String>,
    pub events: Vec<SplitEvent>,
}

impl BatchReport {
    pub fn empty() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: chrono::Local::now().naive_local(),
            documents_total: 0,
            documents_processed: 0,
            documents_failed: 0,
            documents_skipped: 0,
            pages_scanned: 0,
            certificates_produced: 0,
            unmatched_names: 0,
            duration_ms: 0,
            errors: Vec::new(),
            events: Vec::new(),
        }
    }

    /// One-line human summary.
    pub fn summary(&self) -> String {
        format!(
            "{} certificate(s) from {} of {} document(s); {} unmatched name(s), {} failed, {} skipped",
            self.certificates_produced,
            self.documents_processed,
            self.documents_total,
            self.unmatched_names,
            self.documents_failed,
            self.documents_skipped,
        )
    }
}

/// Certificates in production order plus the run report.
#[derive(Debug, Clone)]
pub struct BatchOutcome {
    pub certificates: Vec<OutputCertificate>,
    pub report: BatchReport,
}

/// Progress notification for callers that display batch status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BatchStatusEvent {
    Started {
        document_count: u32,
    },
    Progress {
        completed: u32,
        total: u32,
        current_document: String,
    },
    Completed {
        certificates_produced: u32,
        duration_ms: u64,
    },
}
