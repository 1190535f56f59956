use serde::{Deserialize, Serialize};

use super::naming::sanitize_component;

/// One single-page certificate ready for archiving.
#[derive(Debug, Clone, PartialEq)]
pub struct OutputCertificate {
    pub client_name: String,
    pub canonical_name: String,
    /// 1-based position among this run's certificates for `client_name`.
    pub sequence_index: u32,
    pub file_name: String,
    pub page_bytes: Vec<u8>,
    pub source_document: String,
    pub page_number: usize,
}

impl OutputCertificate {
    /// `{client}/{file_name}`, or just the file name when the client is empty.
    pub fn archive_path(&self) -> String {
        let folder = sanitize_component(&self.client_name);
        if folder.is_empty() {
            self.file_name.clone()
        } else {
            format!("{folder}/{}", self.file_name)
        }
    }
}

/// Diagnostic record emitted while splitting.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SplitEvent {
    NameExtracted {
        document: String,
        page: usize,
        name: String,
    },
    Matched {
        document: String,
        page: usize,
        candidate: String,
        roster_name: String,
        client_name: String,
        confidence: f64,
        file_name: String,
    },
    Unmatched {
        document: String,
        page: usize,
        candidate: String,
        confidence: f64,
        nearest_name: Option<String>,
    },
    NoNameFound {
        document: String,
        page: usize,
    },
    DocumentFailed {
        document: String,
        error: String,
    },
    DocumentSkipped {
        document: String,
        reason: String,
    },
}

/// Everything the splitter produced for one document.
#[derive(Debug, Clone, Default)]
pub struct DocumentSplit {
    pub document: String,
    pub pages_scanned: usize,
    pub certificates: Vec<OutputCertificate>,
    pub events: Vec<SplitEvent>,
}

impl DocumentSplit {
    pub fn new(document: &str) -> Self {
        Self {
            document: document.to_string(),
            ..Self::default()
        }
    }

    pub fn unmatched(&self) -> usize {
        self.events
            .iter()
            .filter(|e| matches!(e, SplitEvent::Unmatched { .. }))
            .count()
    }
}
