//! Destination for the rows produced by the writer.

use std::io;

use camino::Utf8PathBuf;
use thiserror::Error;
use wikitables_core::{Row, Table, UnrecognisedSnak};

/// Errors raised by a [`TableSink`].
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SinkError {
    /// Creating or writing an output file failed.
    #[error("failed to write {path}: {source}")]
    Io {
        /// File or directory being written.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A row could not be serialised.
    #[error("failed to encode a row for {path}: {source}")]
    Encode {
        /// File the row was destined for.
        path: Utf8PathBuf,
        /// Underlying serialisation error.
        source: serde_json::Error,
    },
}

/// Append-only storage for table batches and unrecognised snaks.
///
/// Only the writer thread calls a sink, so implementations need no internal
/// locking.
pub trait TableSink {
    /// Append `rows` to batch `batch_index` of `table`.
    fn append_rows(&mut self, table: Table, batch_index: u64, rows: &[Row])
    -> Result<(), SinkError>;

    /// Append unrecognised snaks to the error log of `worker_id`.
    fn append_unrecognised(
        &mut self,
        worker_id: usize,
        snaks: &[UnrecognisedSnak],
    ) -> Result<(), SinkError>;

    /// Flush everything written so far.
    fn finish(&mut self) -> Result<(), SinkError>;
}

impl<S: TableSink + ?Sized> TableSink for &mut S {
    fn append_rows(
        &mut self,
        table: Table,
        batch_index: u64,
        rows: &[Row],
    ) -> Result<(), SinkError> {
        (**self).append_rows(table, batch_index, rows)
    }

    fn append_unrecognised(
        &mut self,
        worker_id: usize,
        snaks: &[UnrecognisedSnak],
    ) -> Result<(), SinkError> {
        (**self).append_unrecognised(worker_id, snaks)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        (**self).finish()
    }
}
