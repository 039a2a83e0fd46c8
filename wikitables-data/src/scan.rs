//! Parallel scans over a table directory written by the pipeline.
//!
//! A table may be spread over any number of batch files and rows carry no
//! ordering, so every `*.jsonl` file is scanned independently.

use std::{
    io::{self, BufRead, BufReader},
    thread,
};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8;
use crossbeam_channel::{Receiver, unbounded};
use log::{debug, info};
use serde_json::{Map, Value};
use thiserror::Error;
use wikitables_fs::{files_with_extension, open_dir};

/// A scanned row: one JSON object from a batch file.
pub type ScannedRow = Map<String, Value>;

/// Errors raised while scanning a table directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ScanError {
    /// The table directory could not be opened or listed.
    #[error("failed to open table directory {path}: {source}")]
    OpenDir {
        /// Table directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A batch file could not be read.
    #[error("failed to read {path}: {source}")]
    Read {
        /// Batch file.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A line was not a JSON object.
    #[error("malformed row in {path} at line {line}: {source}")]
    Decode {
        /// Batch file.
        path: Utf8PathBuf,
        /// One-based line number.
        line: usize,
        /// Underlying parse error.
        source: serde_json::Error,
    },
    /// The worker count was zero.
    #[error("scan workers must be greater than zero")]
    NoWorkers,
    /// A scan thread could not be started.
    #[error("failed to spawn scan thread: {source}")]
    Spawn {
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A scan thread panicked.
    #[error("scan thread panicked")]
    TaskPanicked,
}

/// Field-equality constraints a row must satisfy.
///
/// # Examples
/// ```
/// use serde_json::json;
/// use wikitables_data::RowFilter;
///
/// let filter = RowFilter::relation("P31", "Q5");
/// let row = json!({"claim_id": "c1", "entity_id": "Q42", "property_id": "P31", "value": "Q5"});
/// assert!(filter.matches(row.as_object().expect("object")));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowFilter {
    constraints: Vec<(String, Value)>,
}

impl RowFilter {
    /// Rows whose `name` field equals `value`.
    pub fn field(name: impl Into<String>, value: impl Into<Value>) -> Self {
        Self::default().and(name, value)
    }

    /// Claim rows for `property` whose value is `value`.
    pub fn relation(property: impl Into<String>, value: impl Into<String>) -> Self {
        Self::field("property_id", property.into()).and("value", value.into())
    }

    /// Alias rows naming `name`.
    pub fn alias(name: impl Into<String>) -> Self {
        Self::field("alias", name.into())
    }

    /// Add another constraint.
    #[must_use]
    pub fn and(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.constraints.push((name.into(), value.into()));
        self
    }

    /// Whether `row` satisfies every constraint.
    #[must_use]
    pub fn matches(&self, row: &ScannedRow) -> bool {
        self.constraints
            .iter()
            .all(|(name, value)| row.get(name) == Some(value))
    }
}

/// Return every row in the `*.jsonl` files of `dir` that matches `filter`.
///
/// Files are shared among `workers` threads; row order is unspecified.
pub fn scan_table(
    dir: &Utf8Path,
    filter: &RowFilter,
    workers: usize,
) -> Result<Vec<ScannedRow>, ScanError> {
    if workers == 0 {
        return Err(ScanError::NoWorkers);
    }
    let open_err = |source| ScanError::OpenDir {
        path: dir.to_path_buf(),
        source,
    };
    let table = open_dir(dir).map_err(open_err)?;
    let names = files_with_extension(&table, "jsonl").map_err(open_err)?;
    info!("scanning {} files in {dir}", names.len());

    let (queue_tx, queue_rx) = unbounded();
    for name in names {
        // The receiver is still alive here.
        let _ = queue_tx.send(name);
    }
    drop(queue_tx);

    let outcomes = thread::scope(|scope| -> Result<Vec<_>, ScanError> {
        let mut handles = Vec::with_capacity(workers);
        for worker_id in 0..workers {
            let queue = queue_rx.clone();
            let table = &table;
            let handle = thread::Builder::new()
                .name(format!("scan-{worker_id}"))
                .spawn_scoped(scope, move || scan_files(dir, table, &queue, filter))
                .map_err(|source| ScanError::Spawn { source })?;
            handles.push(handle);
        }
        Ok(handles
            .into_iter()
            .map(|handle| handle.join().map_err(|_| ScanError::TaskPanicked))
            .collect())
    })?;

    let mut matches = Vec::new();
    for outcome in outcomes {
        matches.extend(outcome??);
    }
    info!("found {} matching rows in {dir}", matches.len());
    Ok(matches)
}

fn scan_files(
    dir: &Utf8Path,
    table: &fs_utf8::Dir,
    queue: &Receiver<String>,
    filter: &RowFilter,
) -> Result<Vec<ScannedRow>, ScanError> {
    let mut matches = Vec::new();
    for name in queue {
        let path = dir.join(&name);
        debug!("scanning {path}");
        let file = table.open(&name).map_err(|source| ScanError::Read {
            path: path.clone(),
            source,
        })?;
        for (index, item) in BufReader::new(file).lines().enumerate() {
            let line = item.map_err(|source| ScanError::Read {
                path: path.clone(),
                source,
            })?;
            if line.trim().is_empty() {
                continue;
            }
            let row: ScannedRow =
                serde_json::from_str(&line).map_err(|source| ScanError::Decode {
                    path: path.clone(),
                    line: index + 1,
                    source,
                })?;
            if filter.matches(&row) {
                matches.push(row);
            }
        }
    }
    Ok(matches)
}
