//! In-memory sinks for pipeline tests.

use std::{collections::BTreeMap, time::Duration};

use crossbeam_channel::{Receiver, Sender};
use wikitables_core::{Row, Table, UnrecognisedSnak};

use crate::writer::{SinkError, TableSink};

/// [`TableSink`] that keeps every batch in memory.
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    batches: BTreeMap<Table, BTreeMap<u64, Vec<Row>>>,
    unrecognised: BTreeMap<usize, Vec<UnrecognisedSnak>>,
    finished: bool,
}

impl MemorySink {
    /// Empty sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rows in batch `index` of `table`.
    #[must_use]
    pub fn batch(&self, table: Table, index: u64) -> &[Row] {
        self.batches
            .get(&table)
            .and_then(|batches| batches.get(&index))
            .map_or(&[][..], Vec::as_slice)
    }

    /// Batch indices written for `table`, ascending.
    #[must_use]
    pub fn batch_indices(&self, table: Table) -> Vec<u64> {
        self.batches
            .get(&table)
            .map(|batches| batches.keys().copied().collect())
            .unwrap_or_default()
    }

    /// Every row written to `table`, in batch order.
    #[must_use]
    pub fn rows(&self, table: Table) -> Vec<&Row> {
        self.batches
            .get(&table)
            .into_iter()
            .flat_map(BTreeMap::values)
            .flatten()
            .collect()
    }

    /// Unrecognised snaks logged by `worker_id`.
    #[must_use]
    pub fn unrecognised(&self, worker_id: usize) -> &[UnrecognisedSnak] {
        self.unrecognised
            .get(&worker_id)
            .map_or(&[][..], Vec::as_slice)
    }

    /// Unrecognised snaks across every worker.
    #[must_use]
    pub fn all_unrecognised(&self) -> Vec<&UnrecognisedSnak> {
        self.unrecognised.values().flatten().collect()
    }

    /// Whether [`TableSink::finish`] has been called.
    #[must_use]
    pub const fn is_finished(&self) -> bool {
        self.finished
    }
}

impl TableSink for MemorySink {
    fn append_rows(
        &mut self,
        table: Table,
        batch_index: u64,
        rows: &[Row],
    ) -> Result<(), SinkError> {
        self.batches
            .entry(table)
            .or_default()
            .entry(batch_index)
            .or_default()
            .extend_from_slice(rows);
        Ok(())
    }

    fn append_unrecognised(
        &mut self,
        worker_id: usize,
        snaks: &[UnrecognisedSnak],
    ) -> Result<(), SinkError> {
        self.unrecognised
            .entry(worker_id)
            .or_default()
            .extend_from_slice(snaks);
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.finished = true;
        Ok(())
    }
}

/// Test-side handle for a [`GatedSink`].
#[derive(Debug)]
pub struct Gate {
    release: Sender<()>,
    entered: Receiver<()>,
}

impl Gate {
    /// Wait until the writer is blocked on the gate.
    #[must_use]
    pub fn wait_until_blocked(&self, timeout: Duration) -> bool {
        self.entered.recv_timeout(timeout).is_ok()
    }

    /// Let the writer continue.
    pub fn open(self) {
        drop(self.release);
    }
}

/// Wraps a sink and blocks the first row append until its [`Gate`] opens.
#[derive(Debug)]
pub struct GatedSink<S> {
    inner: S,
    entered: Option<Sender<()>>,
    release: Receiver<()>,
}

impl<S> GatedSink<S> {
    /// Gate `inner`, returning the sink and the handle that opens it.
    pub fn new(inner: S) -> (Self, Gate) {
        let (release_tx, release_rx) = crossbeam_channel::bounded(0);
        let (entered_tx, entered_rx) = crossbeam_channel::bounded(1);
        let sink = Self {
            inner,
            entered: Some(entered_tx),
            release: release_rx,
        };
        let gate = Gate {
            release: release_tx,
            entered: entered_rx,
        };
        (sink, gate)
    }

    /// Unwrap the inner sink.
    pub fn into_inner(self) -> S {
        self.inner
    }
}

impl<S: TableSink> TableSink for GatedSink<S> {
    fn append_rows(
        &mut self,
        table: Table,
        batch_index: u64,
        rows: &[Row],
    ) -> Result<(), SinkError> {
        if let Some(entered) = self.entered.take() {
            let _ = entered.send(());
            // Returns once the gate's sender is dropped.
            let _ = self.release.recv();
        }
        self.inner.append_rows(table, batch_index, rows)
    }

    fn append_unrecognised(
        &mut self,
        worker_id: usize,
        snaks: &[UnrecognisedSnak],
    ) -> Result<(), SinkError> {
        self.inner.append_unrecognised(worker_id, snaks)
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        self.inner.finish()
    }
}
