use std::path::PathBuf;

use clap::Parser;

use crate::pipeline::batch::{BatchReport, BatchStatusEvent};
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::processor::{read_documents, CertificateProcessor, ProcessingError};
use crate::pipeline::splitter::DateSource;
use crate::pipeline_config::{ConfigError, SplitConfig};

#[derive(Debug, Parser)]
#[command(
    name = "certsplit",
    about = "Split PDF certificate batches into per-recipient files grouped by client",
    version
)]
pub struct Cli {
    /// Roster mapping recipient names to clients (.xlsx, .xls, .ods, .csv,
    /// .tsv, .txt or .json).
    #[arg(long, short = 'r')]
    pub roster: PathBuf,

    /// ZIP archive to write.
    #[arg(long, short = 'o')]
    pub output: PathBuf,

    /// Date token used in every file name (default: today, dd-mm-YYYY).
    #[arg(long, conflicts_with = "date_from_text")]
    pub date: Option<String>,

    /// Take the date from each certificate's text, falling back to the
    /// configured or current date.
    #[arg(long)]
    pub date_from_text: bool,

    /// Minimum similarity (exclusive) for a name to match the roster.
    #[arg(long)]
    pub threshold: Option<f64>,

    /// JSON configuration file; flags override its values.
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Write the run report as JSON.
    #[arg(long)]
    pub report: Option<PathBuf>,

    /// Certificate PDFs to split.
    #[arg(required = true)]
    pub documents: Vec<PathBuf>,
}

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Processing(#[from] ProcessingError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Could not write report {path}: {source}")]
    Report {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("Could not serialize report: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("No certificate was produced: {0}")]
    NoCertificates(String),
}

impl Cli {
    /// Configuration file (or defaults) with command-line overrides applied.
    pub fn effective_config(&self) -> Result<SplitConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => SplitConfig::from_json_file(path)?,
            None => SplitConfig::default(),
        };

        if let Some(threshold) = self.threshold {
            config.matching.threshold = threshold;
        }

        if self.date_from_text {
            let fallback = match &config.date {
                DateSource::Fixed { token } => token.clone(),
                DateSource::FromText { fallback } => fallback.clone(),
            };
            config.date = DateSource::from_text(&fallback);
        } else if let Some(token) = &self.date {
            config.date = DateSource::fixed(token);
        }

        config.validate()?;
        Ok(config)
    }
}

/// Run one batch as described by the command line and return its report.
pub fn run(cli: &Cli) -> Result<BatchReport, CliError> {
    let config = cli.effective_config()?;
    let processor = CertificateProcessor::new(config)?;

    let roster = processor.load_roster(&cli.roster)?;
    let documents = read_documents(&cli.documents)?;

    let progress = |event: BatchStatusEvent| tracing::debug!(?event, "Batch progress");
    let output = processor.process(
        &roster,
        &documents,
        &CancellationToken::new(),
        Some(&progress),
    )?;

    if let Some(path) = &cli.report {
        let json = serde_json::to_string_pretty(&output.report)?;
        std::fs::write(path, json).map_err(|source| CliError::Report {
            path: path.clone(),
            source,
        })?;
    }

    if output.archive.is_empty() {
        return Err(CliError::NoCertificates(output.report.summary()));
    }

    output
        .archive
        .write_to(&cli.output)
        .map_err(ProcessingError::from)?;

    Ok(output.report)
}
