use std::time::Instant;

use super::error::BatchError;
use super::types::{BatchOutcome, BatchReport, BatchStatusEvent};
use crate::pipeline::cancel::CancellationToken;
use crate::pipeline::import::{IntakeChecker, SourceDocument};
use crate::pipeline::splitter::{CertificateSplitter, SplitError, SplitEvent};

/// Run every document through intake and the splitter, in order.
///
/// Skipped and failed documents are logged and recorded in the report;
/// they never abort the batch. Cancellation is checked between documents
/// and between pages, and discards everything produced so far.
pub fn run_batch(
    documents: &[SourceDocument],
    splitter: &mut CertificateSplitter<'_>,
    max_document_bytes: u64,
    cancel: &CancellationToken,
    progress_fn: Option<&dyn Fn(BatchStatusEvent)>,
) -> Result<BatchOutcome, BatchError> {
    let start = Instant::now();
    let total = documents.len() as u32;

    let mut report = BatchReport::empty();
    report.documents_total = total;
    let mut certificates = Vec::new();
    let mut intake = IntakeChecker::new(max_document_bytes);

    tracing::info!(run_id = %report.run_id, documents = total, "Batch started");

    if let Some(progress) = progress_fn {
        progress(BatchStatusEvent::Started {
            document_count: total,
        });
    }

    for (i, doc) in documents.iter().enumerate() {
        if cancel.is_cancelled() {
            tracing::info!(run_id = %report.run_id, completed = i, "Batch cancelled");
            return Err(BatchError::Cancelled);
        }

        if let Some(progress) = progress_fn {
            progress(BatchStatusEvent::Progress {
                completed: i as u32,
                total,
                current_document: doc.name.clone(),
            });
        }

        if let Err(e) = intake.check(doc) {
            tracing::warn!(document = %doc.name, reason = %e, "Document skipped");
            report.documents_skipped += 1;
            report.errors.push(format!("{}: {e}", doc.name));
            report.events.push(SplitEvent::DocumentSkipped {
                document: doc.name.clone(),
                reason: e.to_string(),
            });
            continue;
        }

        match splitter.split_with_cancel(doc, cancel) {
            Ok(split) => {
                report.documents_processed += 1;
                report.pages_scanned += split.pages_scanned as u32;
                report.unmatched_names += split.unmatched() as u32;
                report.certificates_produced += split.certificates.len() as u32;
                certificates.extend(split.certificates);
                report.events.extend(split.events);
            }
            Err(SplitError::Cancelled) => {
                tracing::info!(run_id = %report.run_id, document = %doc.name, "Batch cancelled");
                return Err(BatchError::Cancelled);
            }
            Err(e) => {
                tracing::warn!(document = %doc.name, error = %e, "Document failed");
                report.documents_failed += 1;
                report.errors.push(format!("{}: {e}", doc.name));
                report.events.push(SplitEvent::DocumentFailed {
                    document: doc.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report.duration_ms = start.elapsed().as_millis() as u64;

    tracing::info!(
        run_id = %report.run_id,
        processed = report.documents_processed,
        failed = report.documents_failed,
        skipped = report.documents_skipped,
        certificates = report.certificates_produced,
        unmatched = report.unmatched_names,
        duration_ms = report.duration_ms,
        "Batch completed"
    );

    if let Some(progress) = progress_fn {
        progress(BatchStatusEvent::Completed {
            certificates_produced: report.certificates_produced,
            duration_ms: report.duration_ms,
        });
    }

    Ok(BatchOutcome {
        certificates,
        report,
    })
}
