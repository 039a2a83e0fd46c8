//! Output directory layout.

use std::io;

use camino::{Utf8Path, Utf8PathBuf};
use log::info;
use thiserror::Error;
use wikitables_core::Table;
use wikitables_fs::{ensure_dir, reset_child_dir};

/// Directory holding the unrecognised-datatype logs.
pub const ERRORS_DIR: &str = "errors";

/// Errors raised while preparing the output directory.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PrepareOutputError {
    /// The output directory could not be created or opened.
    #[error("failed to create output directory {path}: {source}")]
    CreateRoot {
        /// The output directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A table directory could not be cleared.
    #[error("failed to reset {path}: {source}")]
    ResetDir {
        /// The table or error directory.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
}

/// Create `out_dir` and empty every table directory plus `errors/`.
///
/// Anything else under `out_dir` is left alone.
pub fn prepare_output_dir(out_dir: &Utf8Path) -> Result<(), PrepareOutputError> {
    let root = ensure_dir(out_dir).map_err(|source| PrepareOutputError::CreateRoot {
        path: out_dir.to_path_buf(),
        source,
    })?;
    for name in Table::ALL.iter().map(Table::as_str).chain([ERRORS_DIR]) {
        reset_child_dir(&root, name).map_err(|source| PrepareOutputError::ResetDir {
            path: out_dir.join(name),
            source,
        })?;
    }
    info!("prepared output directory {out_dir}");
    Ok(())
}
