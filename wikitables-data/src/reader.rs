//! Group dump lines into batches for the worker pool.

use std::{
    io::{self, BufRead},
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
};

use camino::Utf8PathBuf;
use crossbeam_channel::Sender;
use log::{debug, info, warn};
use thiserror::Error;

/// Errors raised while sourcing lines from a dump.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ReadError {
    /// The dump file could not be opened.
    #[error("failed to open dump {path}: {source}")]
    Open {
        /// Path of the dump.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// Reading the dump failed part way through.
    #[error("failed to read dump after line {line}: {source}")]
    Read {
        /// Number of lines read successfully before the failure.
        line: u64,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Consecutive raw lines handed to one worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineBatch {
    /// Sequence number of the batch, starting at 0.
    pub id: u64,
    /// Raw line bytes without the line terminator.
    pub lines: Vec<Vec<u8>>,
}

/// Shared count of lines read from the dump.
#[derive(Debug, Clone, Default)]
pub struct LineCounter(Arc<AtomicU64>);

impl LineCounter {
    /// Current number of lines read.
    #[must_use]
    pub fn get(&self) -> u64 {
        self.0.load(Ordering::Relaxed)
    }

    fn increment(&self) {
        self.0.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Lazily split a line source into [`LineBatch`]es.
///
/// Only the batch under construction is held in memory. The final batch may
/// be shorter than the batch size; no empty batch is ever produced.
///
/// # Examples
/// ```
/// use std::io::Cursor;
/// use wikitables_data::BatchReader;
///
/// let reader = BatchReader::new(Cursor::new("a\nb\nc\n"), 2);
/// let sizes: Vec<usize> = reader.map(|batch| batch.map(|b| b.lines.len())).collect::<Result<_, _>>()?;
/// assert_eq!(sizes, vec![2, 1]);
/// # Ok::<(), wikitables_data::ReadError>(())
/// ```
#[derive(Debug)]
pub struct BatchReader<R> {
    source: R,
    lines_per_batch: usize,
    max_lines: Option<u64>,
    counter: LineCounter,
    lines_read: u64,
    next_id: u64,
    exhausted: bool,
}

impl<R: BufRead> BatchReader<R> {
    /// Batch `source` into groups of `lines_per_batch` lines (at least one).
    pub fn new(source: R, lines_per_batch: usize) -> Self {
        Self {
            source,
            lines_per_batch: lines_per_batch.max(1),
            max_lines: None,
            counter: LineCounter::default(),
            lines_read: 0,
            next_id: 0,
            exhausted: false,
        }
    }

    /// Stop after `max_lines` lines when set.
    #[must_use]
    pub fn with_max_lines(mut self, max_lines: Option<u64>) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Report progress through `counter` instead of a private one.
    #[must_use]
    pub fn with_counter(mut self, counter: LineCounter) -> Self {
        self.counter = counter;
        self
    }

    /// Handle on the running line count.
    pub fn counter(&self) -> LineCounter {
        self.counter.clone()
    }

    fn limit_reached(&self) -> bool {
        self.max_lines.is_some_and(|max| self.lines_read >= max)
    }

    fn read_line(&mut self) -> Result<Option<Vec<u8>>, ReadError> {
        let mut line = Vec::new();
        let read = self
            .source
            .read_until(b'\n', &mut line)
            .map_err(|source| ReadError::Read {
                line: self.lines_read,
                source,
            })?;
        if read == 0 {
            return Ok(None);
        }
        if line.last() == Some(&b'\n') {
            line.pop();
            if line.last() == Some(&b'\r') {
                line.pop();
            }
        }
        self.lines_read += 1;
        self.counter.increment();
        Ok(Some(line))
    }
}

impl<R: BufRead> Iterator for BatchReader<R> {
    type Item = Result<LineBatch, ReadError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.exhausted {
            return None;
        }
        let mut lines = Vec::with_capacity(self.lines_per_batch);
        while lines.len() < self.lines_per_batch {
            if self.limit_reached() {
                self.exhausted = true;
                break;
            }
            match self.read_line() {
                Ok(Some(line)) => lines.push(line),
                Ok(None) => {
                    self.exhausted = true;
                    break;
                }
                Err(err) => {
                    self.exhausted = true;
                    return Some(Err(err));
                }
            }
        }
        if lines.is_empty() {
            return None;
        }
        let id = self.next_id;
        self.next_id += 1;
        Some(Ok(LineBatch { id, lines }))
    }
}

/// Outcome of a completed reader stage.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReaderReport {
    /// Batches published to the work channel.
    pub batches: u64,
    /// Lines read from the source.
    pub lines: u64,
}

/// Publish every batch from `reader` into `work`.
///
/// `work` is dropped on return, which closes the channel once the last
/// batch has been taken. Sending stops early if every worker has gone.
pub fn run_reader<R: BufRead>(
    reader: BatchReader<R>,
    work: Sender<LineBatch>,
) -> Result<ReaderReport, ReadError> {
    let counter = reader.counter();
    let mut report = ReaderReport::default();
    for item in reader {
        let batch = item?;
        debug!("read batch {} with {} lines", batch.id, batch.lines.len());
        if work.send(batch).is_err() {
            warn!("work channel closed; reader stopping early");
            break;
        }
        report.batches += 1;
    }
    report.lines = counter.get();
    info!(
        "reader finished: {} lines in {} batches",
        report.lines, report.batches
    );
    Ok(report)
}
