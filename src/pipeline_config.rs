//! Run configuration for the certificate pipeline.
//!
//! Everything tunable per document style lives here: the match threshold,
//! roster column aliases, the date token source, name-extraction templates
//! and the per-document size limit. Loaded from JSON; every field has a
//! default, so `{}` is a valid configuration.

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::pipeline::extraction::{
    FirstMatchExtractor, NameExtractor, PhraseNameExtractor, DEFAULT_PHRASE,
    DEFAULT_TRAILING_MARKERS,
};
use crate::pipeline::import::MAX_DOCUMENT_BYTES;
use crate::pipeline::matching::{FuzzyMatcher, MatchConfig, MatchError};
use crate::pipeline::roster::RosterColumns;
use crate::pipeline::splitter::DateSource;

// ═══════════════════════════════════════════════════════════
// Types
// ═══════════════════════════════════════════════════════════

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Could not parse configuration: {0}")]
    Parse(#[from] serde_json::Error),

    #[error(transparent)]
    InvalidThreshold(#[from] MatchError),

    #[error("Invalid name template: {0}")]
    InvalidTemplate(String),

    #[error("max_document_bytes must be greater than zero")]
    InvalidDocumentLimit,
}

/// One "anchor phrase → name" template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhraseTemplate {
    pub phrase: String,
    #[serde(default)]
    pub trailing_markers: Vec<String>,
}

/// Name templates, tried in order until one finds a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExtractorConfig {
    pub templates: Vec<PhraseTemplate>,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            templates: vec![PhraseTemplate {
                phrase: DEFAULT_PHRASE.to_string(),
                trailing_markers: DEFAULT_TRAILING_MARKERS
                    .iter()
                    .map(|m| m.to_string())
                    .collect(),
            }],
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SplitConfig {
    pub matching: MatchConfig,
    pub roster_columns: RosterColumns,
    pub date: DateSource,
    pub extractor: ExtractorConfig,
    pub max_document_bytes: u64,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            matching: MatchConfig::default(),
            roster_columns: RosterColumns::default(),
            date: DateSource::default(),
            extractor: ExtractorConfig::default(),
            max_document_bytes: MAX_DOCUMENT_BYTES,
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Loading & validation
// ═══════════════════════════════════════════════════════════

impl SplitConfig {
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_json_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&text)?;
        tracing::debug!(path = %path.display(), "Configuration loaded");
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.matching.validate()?;

        if self.max_document_bytes == 0 {
            return Err(ConfigError::InvalidDocumentLimit);
        }
        if self.extractor.templates.is_empty() {
            return Err(ConfigError::InvalidTemplate("no templates configured".into()));
        }
        if let Some(i) = self
            .extractor
            .templates
            .iter()
            .position(|t| t.phrase.trim().is_empty())
        {
            return Err(ConfigError::InvalidTemplate(format!(
                "template {} has an empty phrase",
                i + 1
            )));
        }
        Ok(())
    }

    pub fn build_matcher(&self) -> Result<FuzzyMatcher, ConfigError> {
        Ok(FuzzyMatcher::new(&self.matching)?)
    }

    /// A single template runs directly; several are chained in order.
    pub fn build_extractor(&self) -> Result<Box<dyn NameExtractor>, ConfigError> {
        let mut extractors = self
            .extractor
            .templates
            .iter()
            .map(|t| {
                PhraseNameExtractor::new(&t.phrase, &t.trailing_markers)
                    .map_err(|e| ConfigError::InvalidTemplate(e.to_string()))
            })
            .collect::<Result<Vec<_>, _>>()?;

        match extractors.len() {
            0 => Err(ConfigError::InvalidTemplate("no templates configured".into())),
            1 => Ok(Box::new(extractors.remove(0))),
            _ => Ok(Box::new(FirstMatchExtractor::new(
                extractors
                    .into_iter()
                    .map(|e| Box::new(e) as Box<dyn NameExtractor>)
                    .collect(),
            ))),
        }
    }
}

// ═══════════════════════════════════════════════════════════
// Tests
// ═══════════════════════════════════════════════════════════
