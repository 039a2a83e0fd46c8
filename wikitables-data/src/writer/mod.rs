//! Single writer stage appending worker output to table files.
//!
//! The writer is the only task that touches output files, so the per-table
//! rotation state lives here without synchronisation.

mod jsonl;
mod rotation;
mod sink;

use std::collections::{BTreeMap, BTreeSet};

use crossbeam_channel::Receiver;
use log::{debug, info};
use wikitables_core::Table;

pub use jsonl::JsonlSink;
pub use rotation::{BatchRotation, TableCursor};
pub use sink::{SinkError, TableSink};

use crate::worker::BatchOutput;

/// Messages consumed by the writer.
#[derive(Debug)]
pub enum WriterMessage {
    /// Rows from one processed batch.
    Batch(BatchOutput),
    /// Every worker has finished; no more batches follow.
    Finished,
}

/// Totals recorded by the writer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WriterReport {
    /// Batches received from workers.
    pub batches: u64,
    /// Rows appended per table.
    pub rows_written: BTreeMap<Table, u64>,
    /// Distinct batch files appended to.
    pub batch_files: u64,
    /// Unrecognised snaks written to error logs.
    pub unrecognised_written: u64,
}

/// Drains [`WriterMessage`]s into a [`TableSink`].
#[derive(Debug)]
pub struct TableWriter<S> {
    sink: S,
    rotation: BatchRotation,
    files: BTreeSet<(Table, u64)>,
    report: WriterReport,
}

impl<S: TableSink> TableWriter<S> {
    /// Write into `sink`, rotating after `rows_per_file` rows per table.
    pub fn new(sink: S, rows_per_file: u64) -> Self {
        Self {
            sink,
            rotation: BatchRotation::new(rows_per_file),
            files: BTreeSet::new(),
            report: WriterReport::default(),
        }
    }

    /// Rotation state so far.
    pub const fn rotation(&self) -> &BatchRotation {
        &self.rotation
    }

    /// Append one batch of worker output.
    pub fn write_batch(&mut self, output: BatchOutput) -> Result<(), SinkError> {
        debug!(
            "writing batch {} from worker {} ({} rows)",
            output.batch_id,
            output.worker_id,
            output.rows.row_count()
        );
        for (table, rows) in output.rows.iter() {
            let count = u64::try_from(rows.len()).unwrap_or(u64::MAX);
            let index = self.rotation.cursor(table).batch_index;
            self.sink.append_rows(table, index, rows)?;
            self.rotation.record(table, count);
            self.files.insert((table, index));
            *self.report.rows_written.entry(table).or_default() += count;
        }
        if !output.unrecognised.is_empty() {
            self.sink
                .append_unrecognised(output.worker_id, &output.unrecognised)?;
            self.report.unrecognised_written +=
                u64::try_from(output.unrecognised.len()).unwrap_or(u64::MAX);
        }
        self.report.batches += 1;
        Ok(())
    }

    /// Consume messages until [`WriterMessage::Finished`] or until every
    /// sender has gone, then flush the sink.
    pub fn run(mut self, messages: &Receiver<WriterMessage>) -> Result<(WriterReport, S), SinkError> {
        for message in messages {
            match message {
                WriterMessage::Batch(output) => self.write_batch(output)?,
                WriterMessage::Finished => break,
            }
        }
        self.finish()
    }

    /// Flush the sink and return the report alongside it.
    pub fn finish(mut self) -> Result<(WriterReport, S), SinkError> {
        self.sink.finish()?;
        self.report.batch_files = u64::try_from(self.files.len()).unwrap_or(u64::MAX);
        info!(
            "writer finished: {} batches into {} files",
            self.report.batches, self.report.batch_files
        );
        Ok((self.report, self.sink))
    }
}

#[cfg(test)]
mod tests;
