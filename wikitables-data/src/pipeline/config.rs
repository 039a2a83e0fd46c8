//! Pipeline settings and their validation.

use std::{io, num::NonZeroUsize, thread};

use camino::{Utf8Path, Utf8PathBuf};
use thiserror::Error;
use wikitables_core::{AliasProperties, TriplifyOptions};
use wikitables_fs::{EntryKind, entry_kind};

/// Default number of lines per read batch and rows per output file.
pub const DEFAULT_BATCH_SIZE: usize = 10_000;

/// Default target language.
pub const DEFAULT_LANGUAGE: &str = "en";

/// Settings that were rejected before the pipeline started.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ConfigError {
    /// The input dump does not exist.
    #[error("input dump {path} does not exist")]
    MissingInput {
        /// Configured input path.
        path: Utf8PathBuf,
    },
    /// The input path exists but is not a regular file.
    #[error("input dump {path} is not a file")]
    InputNotFile {
        /// Configured input path.
        path: Utf8PathBuf,
    },
    /// The output path exists but is not a directory.
    #[error("output path {path} is not a directory")]
    OutputNotDir {
        /// Configured output path.
        path: Utf8PathBuf,
    },
    /// A path could not be inspected.
    #[error("failed to inspect {path}: {source}")]
    Inspect {
        /// Path being inspected.
        path: Utf8PathBuf,
        /// Underlying I/O error.
        source: io::Error,
    },
    /// A numeric setting was zero.
    #[error("{setting} must be greater than zero")]
    Zero {
        /// Name of the offending setting.
        setting: &'static str,
    },
    /// The language identifier was empty.
    #[error("language identifier must not be empty")]
    EmptyLanguage,
}

/// Settings for one pipeline run.
///
/// # Examples
/// ```
/// use wikitables_data::PipelineConfig;
///
/// let config = PipelineConfig::new("latest-all.json.bz2", "tables")
///     .with_language("de")
///     .with_workers(4);
/// assert_eq!(config.channel_capacity(), 8);
/// assert_eq!(config.rows_per_file, 10_000);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Dump to read, plain or bzip2-compressed.
    pub input: Utf8PathBuf,
    /// Directory receiving one subdirectory per table.
    pub out_dir: Utf8PathBuf,
    /// Language used for labels, descriptions, aliases and sitelinks.
    pub language: String,
    /// Properties whose values become aliases.
    pub alias_properties: AliasProperties,
    /// Lines per read batch.
    pub lines_per_batch: usize,
    /// Rows per output file before rotation.
    pub rows_per_file: u64,
    /// Worker thread count.
    pub workers: usize,
    /// Explicit channel capacity; defaults to twice the worker count.
    pub channel_capacity: Option<usize>,
    /// Stop after this many lines.
    pub max_lines: Option<u64>,
}

impl PipelineConfig {
    /// Defaults for reading `input` into `out_dir`.
    pub fn new(input: impl Into<Utf8PathBuf>, out_dir: impl Into<Utf8PathBuf>) -> Self {
        Self {
            input: input.into(),
            out_dir: out_dir.into(),
            language: DEFAULT_LANGUAGE.to_owned(),
            alias_properties: AliasProperties::default(),
            lines_per_batch: DEFAULT_BATCH_SIZE,
            rows_per_file: DEFAULT_BATCH_SIZE as u64,
            workers: default_workers(),
            channel_capacity: None,
            max_lines: None,
        }
    }

    /// Set the target language.
    #[must_use]
    pub fn with_language(mut self, language: impl Into<String>) -> Self {
        self.language = language.into();
        self
    }

    /// Replace the alias-bearing property set.
    #[must_use]
    pub fn with_alias_properties(mut self, alias_properties: AliasProperties) -> Self {
        self.alias_properties = alias_properties;
        self
    }

    /// Set the number of lines per read batch.
    #[must_use]
    pub fn with_lines_per_batch(mut self, lines_per_batch: usize) -> Self {
        self.lines_per_batch = lines_per_batch;
        self
    }

    /// Set the number of rows per output file.
    #[must_use]
    pub fn with_rows_per_file(mut self, rows_per_file: u64) -> Self {
        self.rows_per_file = rows_per_file;
        self
    }

    /// Set the worker count.
    #[must_use]
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the capacity of both channels.
    #[must_use]
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = Some(capacity);
        self
    }

    /// Cap the number of lines read.
    #[must_use]
    pub fn with_max_lines(mut self, max_lines: Option<u64>) -> Self {
        self.max_lines = max_lines;
        self
    }

    /// Capacity of the work and output channels.
    #[must_use]
    pub fn channel_capacity(&self) -> usize {
        self.channel_capacity
            .unwrap_or_else(|| self.workers.saturating_mul(2))
    }

    /// Triplifier options derived from these settings.
    #[must_use]
    pub fn triplify_options(&self) -> TriplifyOptions {
        TriplifyOptions::new(self.language.clone())
            .with_alias_properties(self.alias_properties.clone())
    }

    /// Check every setting, including the input and output paths.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_settings()?;
        validate_input(&self.input)?;
        validate_out_dir(&self.out_dir)
    }

    /// Check the settings that do not touch the filesystem.
    pub fn validate_settings(&self) -> Result<(), ConfigError> {
        let zero = [
            ("lines_per_batch", self.lines_per_batch == 0),
            ("rows_per_file", self.rows_per_file == 0),
            ("workers", self.workers == 0),
            ("channel_capacity", self.channel_capacity() == 0),
        ];
        if let Some((setting, _)) = zero.into_iter().find(|(_, is_zero)| *is_zero) {
            return Err(ConfigError::Zero { setting });
        }
        if self.language.trim().is_empty() {
            return Err(ConfigError::EmptyLanguage);
        }
        Ok(())
    }
}

/// Available parallelism minus one thread each for the reader and writer.
#[must_use]
pub fn default_workers() -> usize {
    thread::available_parallelism()
        .map_or(1, NonZeroUsize::get)
        .saturating_sub(2)
        .max(1)
}

fn inspect(path: &Utf8Path) -> Result<EntryKind, ConfigError> {
    entry_kind(path).map_err(|source| ConfigError::Inspect {
        path: path.to_path_buf(),
        source,
    })
}

fn validate_input(path: &Utf8Path) -> Result<(), ConfigError> {
    match inspect(path)? {
        EntryKind::File => Ok(()),
        EntryKind::Missing => Err(ConfigError::MissingInput {
            path: path.to_path_buf(),
        }),
        EntryKind::Dir | EntryKind::Other => Err(ConfigError::InputNotFile {
            path: path.to_path_buf(),
        }),
    }
}

fn validate_out_dir(path: &Utf8Path) -> Result<(), ConfigError> {
    match inspect(path)? {
        EntryKind::Dir | EntryKind::Missing => Ok(()),
        EntryKind::File | EntryKind::Other => Err(ConfigError::OutputNotDir {
            path: path.to_path_buf(),
        }),
    }
}
