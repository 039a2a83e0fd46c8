//! Worker stage: decode batches and triplify their records.

use std::collections::BTreeSet;

use crossbeam_channel::{Receiver, Sender};
use log::{debug, info, warn};
use thiserror::Error;
use wikitables_core::{EntityRecord, TableRows, TriplifyOptions, UnrecognisedSnak, triplify};

use crate::{dump::preprocess_line, reader::LineBatch, writer::WriterMessage};

/// A line that could not be decoded into an entity record.
#[derive(Debug, Error)]
#[error("failed to decode entity: {source}")]
pub struct DecodeError {
    #[from]
    source: simd_json::Error,
}

/// Decode one raw dump line.
///
/// Returns `Ok(None)` for lines that carry no record (blank lines and array
/// brackets). Invalid UTF-8 is reported as a decode error.
pub fn decode_line(line: &mut [u8]) -> Result<Option<EntityRecord>, DecodeError> {
    let Some(json) = preprocess_line(line) else {
        return Ok(None);
    };
    Ok(Some(simd_json::from_slice(json)?))
}

/// Rows produced from one [`LineBatch`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BatchOutput {
    /// Identifier of the originating batch.
    pub batch_id: u64,
    /// Worker that processed the batch.
    pub worker_id: usize,
    /// Rows merged across every record of the batch.
    pub rows: TableRows,
    /// Snaks with unrecognised datatypes.
    pub unrecognised: Vec<UnrecognisedSnak>,
}

/// Counters accumulated by one worker.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WorkerReport {
    /// Worker identifier.
    pub worker_id: usize,
    /// Batches processed.
    pub batches: u64,
    /// Lines decoded into records.
    pub lines_decoded: u64,
    /// Blank and structural lines skipped.
    pub lines_skipped: u64,
    /// Lines that failed to decode.
    pub decode_errors: u64,
    /// Snaks with unrecognised datatypes.
    pub unrecognised: u64,
}

impl WorkerReport {
    /// Empty report for `worker_id`.
    #[must_use]
    pub fn new(worker_id: usize) -> Self {
        Self {
            worker_id,
            ..Self::default()
        }
    }
}

/// Decode and triplify every line in `batch`.
///
/// Decode failures are counted in `report` and skipped.
pub fn process_batch(
    batch: LineBatch,
    options: &TriplifyOptions,
    report: &mut WorkerReport,
) -> BatchOutput {
    let mut output = BatchOutput {
        batch_id: batch.id,
        worker_id: report.worker_id,
        ..BatchOutput::default()
    };
    for (offset, mut line) in batch.lines.into_iter().enumerate() {
        match decode_line(&mut line) {
            Ok(Some(record)) => {
                report.lines_decoded += 1;
                let triplified = triplify(&record, options);
                output.rows.extend(triplified.rows);
                output.unrecognised.extend(triplified.unrecognised);
            }
            Ok(None) => report.lines_skipped += 1,
            Err(err) => {
                report.decode_errors += 1;
                debug!(
                    "worker {}: batch {} line {offset}: {err}",
                    report.worker_id, batch.id
                );
            }
        }
    }
    report.batches += 1;
    report.unrecognised += u64::try_from(output.unrecognised.len()).unwrap_or(u64::MAX);
    output
}

/// Process batches from `work` until it closes, publishing results to `output`.
///
/// Returns early if the writer has gone away.
pub fn run_worker(
    worker_id: usize,
    work: &Receiver<LineBatch>,
    output: &Sender<WriterMessage>,
    options: &TriplifyOptions,
) -> WorkerReport {
    let mut report = WorkerReport::new(worker_id);
    let mut seen_datatypes = BTreeSet::new();
    for batch in work {
        let processed = process_batch(batch, options, &mut report);
        for snak in &processed.unrecognised {
            if seen_datatypes.insert(snak.datatype.clone()) {
                warn!(
                    "worker {worker_id}: unrecognised datatype '{}' on {}",
                    snak.datatype, snak.entity_id
                );
            }
        }
        if output.send(WriterMessage::Batch(processed)).is_err() {
            warn!("worker {worker_id}: output channel closed; stopping");
            break;
        }
    }
    info!(
        "worker {worker_id} finished: {} batches, {} records, {} decode errors",
        report.batches, report.lines_decoded, report.decode_errors
    );
    report
}
