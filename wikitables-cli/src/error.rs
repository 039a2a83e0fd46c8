//! Error types emitted by the wikitables CLI.
//!
//! Keep this error type reasonably small, as every CLI helper returns
//! `Result<_, CliError>`.

use std::sync::Arc;

use thiserror::Error;
use wikitables_data::{PipelineError, ScanError};

/// Errors emitted by the wikitables CLI.
#[derive(Debug, Error)]
pub enum CliError {
    /// Provided arguments failed Clap validation.
    #[error(transparent)]
    ArgumentParsing(#[from] clap::Error),
    /// Configuration layering failed (files, env, CLI).
    #[error("failed to load configuration: {0}")]
    Configuration(#[from] Arc<ortho_config::OrthoError>),
    /// A required option is missing after configuration merging.
    #[error("missing {field} (set --{field} or {env})")]
    MissingArgument {
        field: &'static str,
        env: &'static str,
    },
    /// `fetch` was given both an alias and a relation to match.
    #[error("--alias cannot be combined with --property/--value")]
    ConflictingQuery,
    /// The alias property override named no properties.
    #[error("--alias-properties must name at least one property")]
    EmptyAliasProperties,
    /// The logging subscriber could not be installed.
    #[error("failed to initialise logging: {0}")]
    Logging(#[source] Box<dyn std::error::Error + Send + Sync>),
    /// The preprocessing pipeline failed.
    #[error(transparent)]
    Pipeline(#[from] PipelineError),
    /// Scanning a table directory failed.
    #[error(transparent)]
    Scan(#[from] ScanError),
    /// A matching row could not be serialised.
    #[error("failed to serialise a matching row: {0}")]
    SerializeRow(#[source] serde_json::Error),
    /// Writing matches to stdout failed.
    #[error("failed to write fetch output: {0}")]
    WriteOutput(#[source] std::io::Error),
}
