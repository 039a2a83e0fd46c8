//! Dump reading, parallel triplification and table writing.
//!
//! Responsibilities:
//! - Open plain or bzip2-compressed Wikidata JSON dumps.
//! - Batch lines, triplify them on a worker pool and write JSONL tables.
//! - Scan written tables for rows matching simple field filters.
//!
//! Boundaries:
//! - Do not encode triplification rules (live in `wikitables-core`).
//! - Only the writer thread opens table files.
//!
//! Invariants:
//! - Memory use is bounded by channel capacity, not dump size.
//! - No global mutable state; rotation counters belong to the writer.

#![forbid(unsafe_code)]

pub mod dump;
pub mod output;
pub mod pipeline;
pub mod reader;
pub mod scan;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
pub mod worker;
pub mod writer;

pub use dump::{open_dump, preprocess_line};
pub use output::{ERRORS_DIR, PrepareOutputError, prepare_output_dir};
pub use pipeline::{
    ConfigError, DEFAULT_BATCH_SIZE, DEFAULT_LANGUAGE, Pipeline, PipelineConfig, PipelineError,
    PipelineReport, default_workers,
};
pub use reader::{BatchReader, LineBatch, LineCounter, ReadError, ReaderReport, run_reader};
pub use scan::{RowFilter, ScanError, ScannedRow, scan_table};
pub use worker::{BatchOutput, DecodeError, WorkerReport, decode_line, process_batch, run_worker};
pub use writer::{
    BatchRotation, JsonlSink, SinkError, TableCursor, TableSink, TableWriter, WriterMessage,
    WriterReport,
};
