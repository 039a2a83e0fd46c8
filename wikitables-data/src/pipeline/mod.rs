//! Reader, worker pool and writer wired together with bounded channels.
//!
//! ```text
//! reader ──(work channel)──▶ workers ×N ──(output channel)──▶ writer
//! ```
//!
//! Both channels are bounded, so a slow writer stalls the workers and a
//! stalled worker pool stalls the reader. Memory use is therefore bounded by
//! the channel capacity times the batch size, whatever the dump size.

mod config;
mod error;

use std::{
    collections::BTreeMap,
    io::BufRead,
    thread::{self, Scope, ScopedJoinHandle},
    time::{Duration, Instant},
};

use crossbeam_channel::bounded;
use log::{error, info};
use wikitables_core::Table;

pub use config::{ConfigError, DEFAULT_BATCH_SIZE, DEFAULT_LANGUAGE, PipelineConfig, default_workers};
pub use error::PipelineError;

use crate::{
    dump::open_dump,
    output::prepare_output_dir,
    reader::{BatchReader, LineBatch, LineCounter, ReadError, ReaderReport, run_reader},
    worker::{WorkerReport, run_worker},
    writer::{JsonlSink, SinkError, TableSink, TableWriter, WriterMessage, WriterReport},
};

/// Totals for one pipeline run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineReport {
    /// Lines read from the dump.
    pub lines_read: u64,
    /// Lines decoded into entity records.
    pub lines_decoded: u64,
    /// Blank and structural lines skipped.
    pub lines_skipped: u64,
    /// Lines that failed to decode.
    pub decode_errors: u64,
    /// Snaks logged with unrecognised datatypes.
    pub unrecognised_snaks: u64,
    /// Batches that passed through the pipeline.
    pub batches: u64,
    /// Rows written per table.
    pub rows_written: BTreeMap<Table, u64>,
    /// Distinct batch files appended to.
    pub batch_files: u64,
    /// Wall-clock duration of the run.
    pub elapsed: Duration,
}

impl PipelineReport {
    /// Rows written across every table.
    #[must_use]
    pub fn total_rows(&self) -> u64 {
        self.rows_written.values().sum()
    }
}

/// A configured triplification run.
#[derive(Debug)]
pub struct Pipeline {
    config: PipelineConfig,
    lines_read: LineCounter,
}

struct StageResults<S> {
    reader: Result<Result<ReaderReport, ReadError>, PipelineError>,
    workers: Vec<Result<WorkerReport, PipelineError>>,
    writer: Result<Result<(WriterReport, S), SinkError>, PipelineError>,
}

impl Pipeline {
    /// Prepare a run with `config`.
    #[must_use]
    pub fn new(config: PipelineConfig) -> Self {
        Self {
            config,
            lines_read: LineCounter::default(),
        }
    }

    /// Settings for this run.
    #[must_use]
    pub const fn config(&self) -> &PipelineConfig {
        &self.config
    }

    /// Live count of lines read, readable from other threads while running.
    #[must_use]
    pub fn lines_read(&self) -> LineCounter {
        self.lines_read.clone()
    }

    /// Read the configured dump and write JSONL tables under `out_dir`.
    ///
    /// The table directories are emptied first.
    pub fn run(&self) -> Result<PipelineReport, PipelineError> {
        self.config.validate()?;
        prepare_output_dir(&self.config.out_dir)?;
        let sink = JsonlSink::create(&self.config.out_dir)?;
        let source = open_dump(&self.config.input)?;
        let (report, _) = self.run_from_reader(source, sink)?;
        Ok(report)
    }

    /// Read the configured dump into `sink`.
    pub fn run_with_sink<S>(&self, sink: S) -> Result<(PipelineReport, S), PipelineError>
    where
        S: TableSink + Send,
    {
        self.config.validate()?;
        let source = open_dump(&self.config.input)?;
        self.run_from_reader(source, sink)
    }

    /// Read lines from `source` into `sink`; the configured input path is
    /// not used.
    pub fn run_from_reader<R, S>(
        &self,
        source: R,
        sink: S,
    ) -> Result<(PipelineReport, S), PipelineError>
    where
        R: BufRead + Send,
        S: TableSink + Send,
    {
        self.config.validate_settings()?;
        let started = Instant::now();
        self.lines_read.reset();
        info!(
            "starting pipeline: {} workers, {} lines per batch, channel capacity {}",
            self.config.workers,
            self.config.lines_per_batch,
            self.config.channel_capacity()
        );

        let stages = self.run_stages(source, sink)?;
        let (mut report, sink) = collect_report(stages)?;
        report.lines_read = self.lines_read.get();
        report.elapsed = started.elapsed();
        info!(
            "pipeline finished in {:.1?}: {} lines read, {} records, {} decode errors, {} rows in {} files, {} unrecognised snaks",
            report.elapsed,
            report.lines_read,
            report.lines_decoded,
            report.decode_errors,
            report.total_rows(),
            report.batch_files,
            report.unrecognised_snaks
        );
        Ok((report, sink))
    }

    fn run_stages<R, S>(&self, source: R, sink: S) -> Result<StageResults<S>, PipelineError>
    where
        R: BufRead + Send,
        S: TableSink + Send,
    {
        let capacity = self.config.channel_capacity();
        let options = self.config.triplify_options();
        let reader = BatchReader::new(source, self.config.lines_per_batch)
            .with_max_lines(self.config.max_lines)
            .with_counter(self.lines_read.clone());
        let writer = TableWriter::new(sink, self.config.rows_per_file);
        let (work_tx, work_rx) = bounded::<LineBatch>(capacity);
        let (out_tx, out_rx) = bounded::<WriterMessage>(capacity);

        thread::scope(|scope| -> Result<StageResults<S>, PipelineError> {
            let writer_handle = spawn(scope, "writer", move || writer.run(&out_rx))?;
            let reader_handle = spawn(scope, "reader", move || run_reader(reader, work_tx))?;
            let mut worker_handles = Vec::with_capacity(self.config.workers);
            for worker_id in 0..self.config.workers {
                let work = work_rx.clone();
                let output = out_tx.clone();
                let options = &options;
                let handle = spawn(scope, &format!("worker-{worker_id}"), move || {
                    run_worker(worker_id, &work, &output, options)
                })?;
                worker_handles.push((worker_id, handle));
            }
            drop(work_rx);

            let reader = join(reader_handle, "reader");
            let workers = worker_handles
                .into_iter()
                .map(|(worker_id, handle)| join(handle, &format!("worker-{worker_id}")))
                .collect();
            // Every worker has finished, so nothing can follow the sentinel.
            let _ = out_tx.send(WriterMessage::Finished);
            drop(out_tx);
            let writer = join(writer_handle, "writer");
            Ok(StageResults {
                reader,
                workers,
                writer,
            })
        })
    }
}

fn spawn<'scope, T, F>(
    scope: &'scope Scope<'scope, '_>,
    task: &str,
    body: F,
) -> Result<ScopedJoinHandle<'scope, T>, PipelineError>
where
    F: FnOnce() -> T + Send + 'scope,
    T: Send + 'scope,
{
    thread::Builder::new()
        .name(task.to_owned())
        .spawn_scoped(scope, body)
        .map_err(|source| PipelineError::Spawn {
            task: task.to_owned(),
            source,
        })
}

fn join<T>(handle: ScopedJoinHandle<'_, T>, task: &str) -> Result<T, PipelineError> {
    handle.join().map_err(|_| {
        error!("{task} thread panicked");
        PipelineError::TaskPanicked {
            task: task.to_owned(),
        }
    })
}

/// Combine stage results; writer failures win over reader and worker ones.
fn collect_report<S>(stages: StageResults<S>) -> Result<(PipelineReport, S), PipelineError> {
    let (writer_report, sink) = stages.writer??;
    let mut report = PipelineReport {
        batches: writer_report.batches,
        rows_written: writer_report.rows_written,
        batch_files: writer_report.batch_files,
        ..PipelineReport::default()
    };
    for outcome in stages.workers {
        let worker = outcome?;
        report.lines_decoded += worker.lines_decoded;
        report.lines_skipped += worker.lines_skipped;
        report.decode_errors += worker.decode_errors;
        report.unrecognised_snaks += worker.unrecognised;
    }
    stages.reader??;
    Ok((report, sink))
}
