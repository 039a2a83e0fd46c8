//! JSON Lines sink writing one directory per table.

use std::{
    collections::BTreeMap,
    io::{BufWriter, Write},
};

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::fs_utf8::{Dir, File};
use log::debug;
use serde::Serialize;
use wikitables_core::{Row, Table, UnrecognisedSnak};
use wikitables_fs::{ensure_dir, open_append};

use super::sink::{SinkError, TableSink};
use crate::output::ERRORS_DIR;

struct OpenBatch {
    index: u64,
    path: Utf8PathBuf,
    file: BufWriter<File>,
}

/// Writes `{out_dir}/{table}/{batch_index}.jsonl` and
/// `{out_dir}/errors/errors-{worker_id}.jsonl`, the latter holding each
/// unrecognised snak exactly as decoded.
///
/// Files are opened in append mode, and only the current batch file of each
/// table is kept open.
pub struct JsonlSink {
    root: Dir,
    root_path: Utf8PathBuf,
    tables: BTreeMap<Table, OpenBatch>,
    errors: BTreeMap<usize, (Utf8PathBuf, BufWriter<File>)>,
}

impl std::fmt::Debug for JsonlSink {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlSink")
            .field("root", &self.root_path)
            .field("open_tables", &self.tables.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

impl JsonlSink {
    /// Write under `out_dir`, creating it and the table directories if needed.
    pub fn create(out_dir: &Utf8Path) -> Result<Self, SinkError> {
        let root = ensure_dir(out_dir).map_err(|source| SinkError::Io {
            path: out_dir.to_path_buf(),
            source,
        })?;
        let names = Table::ALL.iter().map(Table::as_str).chain([ERRORS_DIR]);
        for name in names {
            root.create_dir_all(name).map_err(|source| SinkError::Io {
                path: out_dir.join(name),
                source,
            })?;
        }
        Ok(Self {
            root,
            root_path: out_dir.to_path_buf(),
            tables: BTreeMap::new(),
            errors: BTreeMap::new(),
        })
    }

    fn open(&self, relative: &Utf8Path) -> Result<BufWriter<File>, SinkError> {
        open_append(&self.root, relative)
            .map(BufWriter::new)
            .map_err(|source| SinkError::Io {
                path: self.root_path.join(relative),
                source,
            })
    }

    fn table_file(&mut self, table: Table, index: u64) -> Result<&mut OpenBatch, SinkError> {
        let current = self.tables.get(&table).map(|batch| batch.index);
        if current != Some(index) {
            if let Some(mut previous) = self.tables.remove(&table) {
                flush(&previous.path, &mut previous.file)?;
            }
            let relative = Utf8PathBuf::from(format!("{table}/{index}.jsonl"));
            debug!("opening {}", self.root_path.join(&relative));
            let file = self.open(&relative)?;
            self.tables.insert(
                table,
                OpenBatch {
                    index,
                    path: self.root_path.join(relative),
                    file,
                },
            );
        }
        self.tables.get_mut(&table).ok_or_else(|| SinkError::Io {
            path: self.root_path.join(table.as_str()),
            source: std::io::Error::other("batch file vanished after opening"),
        })
    }
}

fn write_line<T: Serialize>(
    path: &Utf8Path,
    file: &mut BufWriter<File>,
    value: &T,
) -> Result<(), SinkError> {
    serde_json::to_writer(&mut *file, value).map_err(|source| SinkError::Encode {
        path: path.to_path_buf(),
        source,
    })?;
    file.write_all(b"\n").map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}

fn flush(path: &Utf8Path, file: &mut BufWriter<File>) -> Result<(), SinkError> {
    file.flush().map_err(|source| SinkError::Io {
        path: path.to_path_buf(),
        source,
    })
}

impl TableSink for JsonlSink {
    fn append_rows(
        &mut self,
        table: Table,
        batch_index: u64,
        rows: &[Row],
    ) -> Result<(), SinkError> {
        let batch = self.table_file(table, batch_index)?;
        for row in rows {
            write_line(&batch.path, &mut batch.file, row)?;
        }
        Ok(())
    }

    fn append_unrecognised(
        &mut self,
        worker_id: usize,
        snaks: &[UnrecognisedSnak],
    ) -> Result<(), SinkError> {
        if snaks.is_empty() {
            return Ok(());
        }
        if !self.errors.contains_key(&worker_id) {
            let relative = Utf8PathBuf::from(format!("{ERRORS_DIR}/errors-{worker_id}.jsonl"));
            let file = self.open(&relative)?;
            self.errors
                .insert(worker_id, (self.root_path.join(relative), file));
        }
        let Some((path, file)) = self.errors.get_mut(&worker_id) else {
            return Ok(());
        };
        for snak in snaks {
            write_line(path, file, &snak.payload)?;
        }
        Ok(())
    }

    fn finish(&mut self) -> Result<(), SinkError> {
        for batch in self.tables.values_mut() {
            flush(&batch.path, &mut batch.file)?;
        }
        for (path, file) in self.errors.values_mut() {
            flush(path, file)?;
        }
        Ok(())
    }
}
