//! Command-line interface for turning Wikidata dumps into relation tables.
#![forbid(unsafe_code)]

mod error;
mod fetch;

use std::io::{self, Write};

use camino::Utf8PathBuf;
use clap::{Parser, Subcommand};
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use tracing_subscriber::EnvFilter;
use wikitables_core::AliasProperties;
use wikitables_data::{
    DEFAULT_BATCH_SIZE, DEFAULT_LANGUAGE, Pipeline, PipelineConfig, PipelineReport,
    default_workers,
};

pub use error::CliError;
use fetch::{FetchArgs, run_fetch};

const ARG_INPUT_FILE: &str = "input-file";
const ARG_OUT_DIR: &str = "out-dir";
const ENV_INPUT_FILE: &str = "WIKITABLES_CMDS_PREPROCESS_INPUT_FILE";
const ENV_OUT_DIR: &str = "WIKITABLES_CMDS_PREPROCESS_OUT_DIR";
const ARG_DATA: &str = "data";
const ARG_PROPERTY: &str = "property";
const ARG_VALUE: &str = "value";
const ENV_DATA: &str = "WIKITABLES_CMDS_FETCH_DATA";
const ENV_PROPERTY: &str = "WIKITABLES_CMDS_FETCH_PROPERTY";
const ENV_VALUE: &str = "WIKITABLES_CMDS_FETCH_VALUE";

/// Run the wikitables CLI with the current process arguments and environment.
pub fn run() -> Result<(), CliError> {
    let cli = Cli::try_parse().map_err(CliError::ArgumentParsing)?;
    init_logging()?;
    match cli.command {
        Command::Preprocess(args) => {
            run_preprocess(args)?;
        }
        Command::Fetch(args) => {
            let stdout = io::stdout();
            let mut out = stdout.lock();
            run_fetch(args, &mut out)?;
            out.flush().map_err(CliError::WriteOutput)?;
        }
    }
    Ok(())
}

/// Send `log` and `tracing` records to stderr, filtered by `RUST_LOG`.
fn init_logging() -> Result<(), CliError> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init()
        .map_err(CliError::Logging)
}

fn run_preprocess(args: PreprocessArgs) -> Result<PipelineReport, CliError> {
    let config = args.into_config()?;
    info!(
        "preprocessing {} into {} (language {})",
        config.input, config.out_dir, config.language
    );
    let report = Pipeline::new(config).run()?;
    info!(
        "read {} lines in {:.1?}; wrote {} rows",
        report.lines_read,
        report.elapsed,
        report.total_rows()
    );
    Ok(report)
}

#[derive(Debug, Parser)]
#[command(
    name = "wikitables",
    about = "Split Wikidata JSON dumps into relation tables",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Triplify a dump into JSONL table files.
    Preprocess(PreprocessArgs),
    /// Print table rows matching a relation or an alias.
    Fetch(FetchArgs),
}

/// CLI arguments for the `preprocess` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Read a Wikidata JSON dump (optionally bzip2-compressed) and \
                 write labels, descriptions, aliases, claims, qualifiers and \
                 Wikipedia links as JSONL batch files. Settings can come from \
                 CLI flags, configuration files, or environment variables.",
    about = "Triplify a Wikidata dump into JSONL tables"
)]
#[ortho_config(prefix = "WIKITABLES")]
struct PreprocessArgs {
    /// Path to the Wikidata dump (JSON or JSON.BZ2).
    #[arg(long = ARG_INPUT_FILE, value_name = "path")]
    #[serde(default)]
    input_file: Option<Utf8PathBuf>,
    /// Directory receiving one subdirectory per table.
    #[arg(long = ARG_OUT_DIR, value_name = "dir")]
    #[serde(default)]
    out_dir: Option<Utf8PathBuf>,
    /// Language code for labels, descriptions, aliases and sitelinks.
    #[arg(long = "language-id", value_name = "code")]
    #[serde(default)]
    language_id: Option<String>,
    /// Lines per read batch and rows per output file.
    #[arg(long = "batch-size", value_name = "count")]
    #[serde(default)]
    batch_size: Option<usize>,
    /// Worker threads triplifying batches.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    workers: Option<usize>,
    /// Capacity of the work and output channels.
    #[arg(long = "channel-capacity", value_name = "count")]
    #[serde(default)]
    channel_capacity: Option<usize>,
    /// Stop after reading this many lines.
    #[arg(long = "max-lines", value_name = "count")]
    #[serde(default)]
    max_lines: Option<u64>,
    /// Process a single batch only.
    #[arg(long)]
    #[serde(default)]
    test: bool,
    /// Comma-separated properties whose values become aliases.
    #[arg(long = "alias-properties", value_name = "list")]
    #[serde(default)]
    alias_properties: Option<String>,
}

impl PreprocessArgs {
    fn into_config(self) -> Result<PipelineConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        PipelineConfig::try_from(merged)
    }
}

impl TryFrom<PreprocessArgs> for PipelineConfig {
    type Error = CliError;

    fn try_from(args: PreprocessArgs) -> Result<Self, Self::Error> {
        let input = args.input_file.ok_or(CliError::MissingArgument {
            field: ARG_INPUT_FILE,
            env: ENV_INPUT_FILE,
        })?;
        let out_dir = args.out_dir.ok_or(CliError::MissingArgument {
            field: ARG_OUT_DIR,
            env: ENV_OUT_DIR,
        })?;
        let batch_size = args.batch_size.unwrap_or(DEFAULT_BATCH_SIZE);
        let max_lines = if args.test {
            let one_batch = u64::try_from(batch_size).unwrap_or(u64::MAX);
            Some(args.max_lines.map_or(one_batch, |cap| cap.min(one_batch)))
        } else {
            args.max_lines
        };

        let mut config = Self::new(input, out_dir)
            .with_language(args.language_id.unwrap_or_else(|| DEFAULT_LANGUAGE.to_owned()))
            .with_lines_per_batch(batch_size)
            .with_rows_per_file(u64::try_from(batch_size).unwrap_or(u64::MAX))
            .with_workers(args.workers.unwrap_or_else(default_workers))
            .with_max_lines(max_lines);
        if let Some(capacity) = args.channel_capacity {
            config = config.with_channel_capacity(capacity);
        }
        if let Some(list) = args.alias_properties {
            let properties = AliasProperties::parse_list(&list);
            if properties.is_empty() {
                return Err(CliError::EmptyAliasProperties);
            }
            config = config.with_alias_properties(properties);
        }
        Ok(config)
    }
}

#[cfg(test)]
mod tests;
