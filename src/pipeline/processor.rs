//! Certificate processing orchestrator.
//!
//! Single entry point that drives a run end to end:
//! roster → intake → split (extract, match, name) → archive.
//!
//! The PDF reader is injected, so the orchestrator is testable with a
//! text-level mock.

use std::path::{Path, PathBuf};

use crate::pipeline::archive::{self, Archive, ArchiveError};
use crate::pipeline::batch::{run_batch, BatchError, BatchReport, BatchStatusEvent};
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::extraction::{DocumentReader, LopdfReader};
use crate::pipeline::import::{IntakeError, SourceDocument};
use crate::pipeline::roster::{load_table, RosterError, RosterIndex};
use crate::pipeline::splitter::CertificateSplitter;
use crate::pipeline_config::{ConfigError, SplitConfig};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum ProcessingError {
    #[error("Roster error: {0}")]
    Roster(#[from] RosterError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Could not read {path}: {source}")]
    Document { path: PathBuf, source: IntakeError },

    #[error("{0}")]
    Batch(#[from] BatchError),

    #[error("Archive error: {0}")]
    Archive(#[from] ArchiveError),
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

pub struct ProcessingOutput {
    pub archive: Archive,
    pub report: BatchReport,
}

// ---------------------------------------------------------------------------
// Orchestrator
// ---------------------------------------------------------------------------

pub struct CertificateProcessor {
    config: SplitConfig,
    reader: Box<dyn DocumentReader>,
}

impl CertificateProcessor {
    /// Processor reading real PDFs.
    pub fn new(config: SplitConfig) -> Result<Self, ProcessingError> {
        Self::with_reader(config, Box::new(LopdfReader))
    }

    pub fn with_reader(
        config: SplitConfig,
        reader: Box<dyn DocumentReader>,
    ) -> Result<Self, ProcessingError> {
        config.validate()?;
        Ok(Self { config, reader })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Load the roster with the configured column aliases.
    pub fn load_roster(&self, path: &Path) -> Result<RosterIndex, ProcessingError> {
        let table = load_table(path)?;
        let roster = RosterIndex::load_with_columns(&table, &self.config.roster_columns)?;
        if roster.is_empty() {
            tracing::warn!(path = %path.display(), "Roster has no recipients; nothing will match");
        }
        Ok(roster)
    }

    /// Split every document against `roster` and package the results.
    ///
    /// 1. Build the name extractor and matcher from configuration
    /// 2. Run the batch (intake checks, per-page split, partial failure)
    /// 3. Archive the certificates at `{client}/{file_name}`
    ///
    /// A cancelled run returns `BatchError::Cancelled` and no archive.
    pub fn process(
        &self,
        roster: &RosterIndex,
        documents: &[SourceDocument],
        cancel: &CancellationToken,
        progress_fn: Option<&dyn Fn(BatchStatusEvent)>,
    ) -> Result<ProcessingOutput, ProcessingError> {
        let extractor = self.config.build_extractor()?;
        let matcher = self.config.build_matcher()?;

        let mut splitter = CertificateSplitter::new(
            roster,
            self.reader.as_ref(),
            extractor,
            matcher,
            self.config.date.clone(),
        );

        let outcome = run_batch(
            documents,
            &mut splitter,
            self.config.max_document_bytes,
            cancel,
            progress_fn,
        )?;

        let archive = archive::build(outcome.certificates)?;

        Ok(ProcessingOutput {
            archive,
            report: outcome.report,
        })
    }
}

/// Read input files from disk. Any unreadable path fails the whole call.
pub fn read_documents(paths: &[PathBuf]) -> Result<Vec<SourceDocument>, ProcessingError> {
    paths
        .iter()
        .map(|path| {
            SourceDocument::from_path(path).map_err(|source| ProcessingError::Document {
                path: path.clone(),
                source,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::splitter::DateSource;
    use crate::pipeline::test_fixtures::{mock_encrypted_pdf, mock_pdf, MockReader};

    fn processor() -> CertificateProcessor {
        let config = SplitConfig {
            date: DateSource::fixed("25-06-2024"),
            ..SplitConfig::default()
        };
        CertificateProcessor::with_reader(config, Box::new(MockReader)).unwrap()
    }

    fn write_roster(dir: &Path) -> PathBuf {
        let path = dir.join("mapa.csv");
        std::fs::write(
            &path,
            "Formando;Cliente\nMaria Silva;Acme Lda\nJoão Souza;Beta\nRui Costa;Acme Lda\n",
        )
        .unwrap();
        path
    }

    #[test]
    fn end_to_end_archive_layout() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor();
        let roster = processor.load_roster(&write_roster(dir.path())).unwrap();

        let documents = vec![
            SourceDocument::new(
                "lote1.pdf",
                mock_pdf(&[
                    "Certifica-se que Maria Silva natural de Lisboa",
                    "Anexo",
                    "Certifica-se que Joao Souza natural do Porto",
                ]),
            ),
            SourceDocument::new("locked.pdf", mock_encrypted_pdf("locked")),
            SourceDocument::new("lote2.pdf", mock_pdf(&["Certifica-se que Rui Costa"])),
        ];

        let output = processor
            .process(&roster, &documents, &CancellationToken::new(), None)
            .unwrap();

        let paths: Vec<&str> = output
            .archive
            .entries()
            .iter()
            .map(|e| e.path.as_str())
            .collect();
        assert_eq!(
            paths,
            vec![
                "Acme Lda/Acme_Lda_Maria_Silva_25-06-2024_1.pdf",
                "Beta/Beta_João_Souza_25-06-2024_1.pdf",
                "Acme Lda/Acme_Lda_Rui_Costa_25-06-2024_2.pdf",
            ]
        );
        assert_eq!(output.report.documents_failed, 1);
        assert_eq!(output.report.certificates_produced, 3);
    }

    #[test]
    fn missing_roster_column_fails_before_processing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("mapa.csv");
        std::fs::write(&path, "Nome Completo,Empresa\nMaria,Acme\n").unwrap();

        let result = processor().load_roster(&path);
        assert!(matches!(
            result,
            Err(ProcessingError::Roster(RosterError::InvalidRoster { .. }))
        ));
    }

    #[test]
    fn invalid_config_is_rejected_up_front() {
        let mut config = SplitConfig::default();
        config.matching.threshold = 2.0;
        assert!(matches!(
            CertificateProcessor::with_reader(config, Box::new(MockReader)),
            Err(ProcessingError::Config(ConfigError::InvalidThreshold(_)))
        ));
    }

    #[test]
    fn cancelled_run_returns_no_archive() {
        let dir = tempfile::tempdir().unwrap();
        let processor = processor();
        let roster = processor.load_roster(&write_roster(dir.path())).unwrap();
        let cancel = CancellationToken::new();
        cancel.cancel();

        let result = processor.process(
            &roster,
            &[SourceDocument::new("a.pdf", mock_pdf(&["Certifica-se que Maria Silva"]))],
            &cancel,
            None,
        );
        assert!(matches!(
            result,
            Err(ProcessingError::Batch(BatchError::Cancelled))
        ));
    }

    #[test]
    fn read_documents_reports_missing_path() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("a.pdf");
        std::fs::write(&good, b"%PDF-1.4").unwrap();
        let missing = dir.path().join("missing.pdf");

        let docs = read_documents(&[good.clone()]).unwrap();
        assert_eq!(docs[0].name, "a.pdf");

        match read_documents(&[good, missing.clone()]) {
            Err(ProcessingError::Document { path, .. }) => assert_eq!(path, missing),
            other => panic!("expected Document error, got {:?}", other.map(|d| d.len())),
        }
    }
}
