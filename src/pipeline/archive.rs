//! ZIP packaging of split certificates, one folder per client.

use std::collections::HashSet;
use std::io::{Cursor, Write};
use std::path::Path;

use thiserror::Error;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::pipeline::splitter::OutputCertificate;

#[derive(Error, Debug)]
pub enum ArchiveError {
    #[error("Archive already contains {0}")]
    DuplicateEntry(String),

    #[error("ZIP error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub path: String,
    pub bytes: Vec<u8>,
}

/// Ordered archive contents, finalized into a ZIP on demand.
#[derive(Debug, Clone, Default)]
pub struct Archive {
    entries: Vec<ArchiveEntry>,
}

impl Archive {
    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn to_zip_bytes(&self) -> Result<Vec<u8>, ArchiveError> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        let options =
            SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for entry in &self.entries {
            writer.start_file(entry.path.as_str(), options)?;
            writer.write_all(&entry.bytes)?;
        }

        Ok(writer.finish()?.into_inner())
    }

    /// Write the ZIP next to `path` and rename it into place, so readers
    /// never see a partial archive.
    pub fn write_to(&self, path: &Path) -> Result<u64, ArchiveError> {
        let bytes = self.to_zip_bytes()?;

        let dir = match path.parent() {
            Some(p) if !p.as_os_str().is_empty() => p,
            _ => Path::new("."),
        };
        let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
        tmp.write_all(&bytes)?;
        tmp.flush()?;
        tmp.persist(path).map_err(|e| e.error)?;

        tracing::info!(
            path = %path.display(),
            entries = self.entries.len(),
            size_bytes = bytes.len(),
            "Archive written"
        );

        Ok(bytes.len() as u64)
    }
}

/// Collects certificates in production order and rejects repeated paths.
#[derive(Debug, Default)]
pub struct ArchiveBuilder {
    archive: Archive,
    paths: HashSet<String>,
}

impl ArchiveBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, certificate: OutputCertificate) -> Result<(), ArchiveError> {
        let path = certificate.archive_path();
        if !self.paths.insert(path.clone()) {
            return Err(ArchiveError::DuplicateEntry(path));
        }
        self.archive.entries.push(ArchiveEntry {
            path,
            bytes: certificate.page_bytes,
        });
        Ok(())
    }

    pub fn finish(self) -> Archive {
        self.archive
    }
}

/// Archive every certificate at `{client}/{file_name}`, in order.
pub fn build(
    certificates: impl IntoIterator<Item = OutputCertificate>,
) -> Result<Archive, ArchiveError> {
    let mut builder = ArchiveBuilder::new();
    for certificate in certificates {
        builder.add(certificate)?;
    }
    Ok(builder.finish())
}
