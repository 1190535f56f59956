use std::collections::HashMap;

use super::naming::{certificate_file_name, DateSource};
use super::types::{DocumentSplit, OutputCertificate, SplitEvent};
use super::SplitError;
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::extraction::{DocumentReader, NameExtractor};
use crate::pipeline::import::SourceDocument;
use crate::pipeline::matching::FuzzyMatcher;
use crate::pipeline::roster::{RosterEntry, RosterIndex};

/// Turns documents into per-recipient single-page certificates.
///
/// One instance serves one run: it owns the per-client sequence counters,
/// so certificates for the same client are numbered 1, 2, ... across every
/// document split through it. Concurrent runs need separate instances.
pub struct CertificateSplitter<'r> {
    roster: &'r RosterIndex,
    reader: &'r dyn DocumentReader,
    extractor: Box<dyn NameExtractor>,
    matcher: FuzzyMatcher,
    date_source: DateSource,
    client_counts: HashMap<String, u32>,
}

impl<'r> CertificateSplitter<'r> {
    pub fn new(
        roster: &'r RosterIndex,
        reader: &'r dyn DocumentReader,
        extractor: Box<dyn NameExtractor>,
        matcher: FuzzyMatcher,
        date_source: DateSource,
    ) -> Self {
        Self {
            roster,
            reader,
            extractor,
            matcher,
            date_source,
            client_counts: HashMap::new(),
        }
    }

    pub fn split(&mut self, doc: &SourceDocument) -> Result<DocumentSplit, SplitError> {
        self.split_with_cancel(doc, &CancellationToken::new())
    }

    /// Split one document, checking `cancel` before each page.
    ///
    /// A document either succeeds as a whole or contributes nothing:
    /// counters advance only when every page was processed.
    pub fn split_with_cancel(
        &mut self,
        doc: &SourceDocument,
        cancel: &CancellationToken,
    ) -> Result<DocumentSplit, SplitError> {
        let pdf = self.reader.open(&doc.bytes)?;
        let page_count = pdf.page_count();

        tracing::debug!(document = %doc.name, pages = page_count, "Splitting document");

        let mut counts = self.client_counts.clone();
        let mut split = DocumentSplit::new(&doc.name);

        for page in 1..=page_count {
            if cancel.is_cancelled() {
                return Err(SplitError::Cancelled);
            }

            let text = pdf.page_text(page)?;
            split.pages_scanned += 1;

            let Some(candidate) = self.extractor.extract(text) else {
                tracing::debug!(document = %doc.name, page, "No recipient name on page");
                split.events.push(SplitEvent::NoNameFound {
                    document: doc.name.clone(),
                    page,
                });
                continue;
            };

            split.events.push(SplitEvent::NameExtracted {
                document: doc.name.clone(),
                page,
                name: candidate.clone(),
            });

            let result = self.matcher.evaluate_roster(&candidate, self.roster);
            let Some(entry) = result.roster_entry else {
                tracing::warn!(
                    document = %doc.name,
                    page,
                    candidate = %candidate,
                    confidence = result.confidence,
                    nearest = result.nearest_name.as_deref().unwrap_or(""),
                    "Unmatched recipient name"
                );
                split.events.push(SplitEvent::Unmatched {
                    document: doc.name.clone(),
                    page,
                    candidate,
                    confidence: result.confidence,
                    nearest_name: result.nearest_name,
                });
                continue;
            };

            let RosterEntry {
                canonical_name: roster_name,
                client_name,
            } = entry;

            let counter = counts.entry(client_name.clone()).or_insert(0);
            *counter += 1;
            let sequence_index = *counter;

            let date = self.date_source.resolve(text);
            let file_name =
                certificate_file_name(&client_name, &roster_name, &date, sequence_index);
            let page_bytes = pdf.page_bytes(page)?;

            tracing::info!(
                document = %doc.name,
                page,
                recipient = %roster_name,
                client = %client_name,
                confidence = result.confidence,
                file = %file_name,
                "Certificate matched"
            );

            split.events.push(SplitEvent::Matched {
                document: doc.name.clone(),
                page,
                candidate,
                roster_name: roster_name.clone(),
                client_name: client_name.clone(),
                confidence: result.confidence,
                file_name: file_name.clone(),
            });

            split.certificates.push(OutputCertificate {
                client_name,
                canonical_name: roster_name,
                sequence_index,
                file_name,
                page_bytes,
                source_document: doc.name.clone(),
                page_number: page,
            });
        }

        self.client_counts = counts;
        Ok(split)
    }

    /// Certificates produced so far in this run for `client_name`.
    pub fn produced_for(&self, client_name: &str) -> u32 {
        self.client_counts.get(client_name).copied().unwrap_or(0)
    }

    pub fn roster(&self) -> &RosterIndex {
        self.roster
    }
}
