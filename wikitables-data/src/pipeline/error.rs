//! Errors that end a pipeline run.

use thiserror::Error;

use super::config::ConfigError;
use crate::{output::PrepareOutputError, reader::ReadError, writer::SinkError};

/// Fatal pipeline failures.
///
/// Per-line decode failures and unrecognised datatypes never surface here;
/// they are counted in the [`PipelineReport`](super::PipelineReport).
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PipelineError {
    /// Settings were rejected before any thread started.
    #[error(transparent)]
    Config(#[from] ConfigError),
    /// The output directory could not be prepared.
    #[error(transparent)]
    PrepareOutput(#[from] PrepareOutputError),
    /// The dump could not be opened or read.
    #[error(transparent)]
    Read(#[from] ReadError),
    /// Writing table files failed.
    #[error(transparent)]
    Sink(#[from] SinkError),
    /// A pipeline thread could not be started.
    #[error("failed to spawn {task} thread: {source}")]
    Spawn {
        /// Name of the thread.
        task: String,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// A pipeline thread panicked.
    #[error("{task} thread panicked")]
    TaskPanicked {
        /// Name of the thread.
        task: String,
    },
}
