use std::path::Path;

use super::IntakeError;

/// Default per-document size limit.
pub const MAX_DOCUMENT_BYTES: u64 = 100 * 1024 * 1024; // 100MB

/// How far into the file the `%PDF-` header may start. Some producers
/// prepend junk bytes, which readers tolerate.
const PDF_HEADER_WINDOW: usize = 1024;

/// One input document: a display name plus its raw bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceDocument {
    pub name: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            bytes,
        }
    }

    pub fn from_path(path: &Path) -> Result<Self, IntakeError> {
        let bytes = std::fs::read(path)?;
        let name = sanitize_filename(&path.to_string_lossy());
        Ok(Self { name, bytes })
    }

    pub fn size_bytes(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Detect a PDF from magic bytes, not the extension.
pub fn is_pdf(bytes: &[u8]) -> bool {
    let window = &bytes[..bytes.len().min(PDF_HEADER_WINDOW)];
    window.windows(5).any(|w| w == b"%PDF-")
}

/// Strip path components and characters unsafe in file names.
pub fn sanitize_filename(original: &str) -> String {
    let name = Path::new(original)
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("document");

    let clean: String = name
        .chars()
        .filter(|c| !matches!(c, '/' | '\\' | '\0'))
        .take(255)
        .collect();

    if clean.is_empty() {
        "document".to_string()
    } else {
        clean
    }
}
