//! Fetch command: scan a written table for matching rows.

use std::io::Write;

use camino::Utf8PathBuf;
use clap::Parser;
use log::info;
use ortho_config::{OrthoConfig, SubcmdConfigMerge};
use serde::{Deserialize, Serialize};
use wikitables_data::{RowFilter, scan_table};

use crate::{
    ARG_DATA, ARG_PROPERTY, ARG_VALUE, CliError, ENV_DATA, ENV_PROPERTY, ENV_VALUE,
};

/// Default scan thread count.
pub(crate) const DEFAULT_FETCH_WORKERS: usize = 10;

/// CLI arguments for the `fetch` subcommand.
#[derive(Debug, Clone, Parser, Deserialize, Serialize, OrthoConfig, Default)]
#[command(
    long_about = "Scan every JSONL batch file in a table directory and print \
                 the rows whose property and value match, or whose alias \
                 equals the given name.",
    about = "Print table rows matching a relation or an alias"
)]
#[ortho_config(prefix = "WIKITABLES")]
pub(crate) struct FetchArgs {
    /// Table directory to scan, such as `tables/entity_rels`.
    #[arg(long = ARG_DATA, value_name = "dir")]
    #[serde(default)]
    pub(crate) data: Option<Utf8PathBuf>,
    /// Scan threads.
    #[arg(long, value_name = "count")]
    #[serde(default)]
    pub(crate) workers: Option<usize>,
    /// Property identifier to match, such as `P31`.
    #[arg(long = ARG_PROPERTY, value_name = "id")]
    #[serde(default)]
    pub(crate) property: Option<String>,
    /// Value to match alongside `--property`.
    #[arg(long = ARG_VALUE, value_name = "value")]
    #[serde(default)]
    pub(crate) value: Option<String>,
    /// Alias to match instead of a relation.
    #[arg(long, value_name = "name")]
    #[serde(default)]
    pub(crate) alias: Option<String>,
}

impl FetchArgs {
    pub(crate) fn into_config(self) -> Result<FetchConfig, CliError> {
        let merged = self.load_and_merge().map_err(CliError::Configuration)?;
        FetchConfig::try_from(merged)
    }
}

/// What a fetch matches on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum FetchQuery {
    Relation { property: String, value: String },
    Alias(String),
}

impl FetchQuery {
    fn filter(&self) -> RowFilter {
        match self {
            Self::Relation { property, value } => RowFilter::relation(property, value),
            Self::Alias(name) => RowFilter::alias(name),
        }
    }
}

/// Resolved `fetch` command configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct FetchConfig {
    pub(crate) data: Utf8PathBuf,
    pub(crate) workers: usize,
    pub(crate) query: FetchQuery,
}

impl TryFrom<FetchArgs> for FetchConfig {
    type Error = CliError;

    fn try_from(args: FetchArgs) -> Result<Self, Self::Error> {
        let data = args.data.ok_or(CliError::MissingArgument {
            field: ARG_DATA,
            env: ENV_DATA,
        })?;
        let query = match (args.alias, args.property, args.value) {
            (Some(_), Some(_), _) | (Some(_), _, Some(_)) => {
                return Err(CliError::ConflictingQuery);
            }
            (Some(name), None, None) => FetchQuery::Alias(name),
            (None, property, value) => FetchQuery::Relation {
                property: property.ok_or(CliError::MissingArgument {
                    field: ARG_PROPERTY,
                    env: ENV_PROPERTY,
                })?,
                value: value.ok_or(CliError::MissingArgument {
                    field: ARG_VALUE,
                    env: ENV_VALUE,
                })?,
            },
        };
        Ok(Self {
            data,
            workers: args.workers.unwrap_or(DEFAULT_FETCH_WORKERS),
            query,
        })
    }
}

/// Write each matching row to `out` as one JSON line; returns the match count.
pub(crate) fn run_fetch(args: FetchArgs, out: &mut impl Write) -> Result<usize, CliError> {
    let config = args.into_config()?;
    fetch_rows(&config, out)
}

pub(crate) fn fetch_rows(config: &FetchConfig, out: &mut impl Write) -> Result<usize, CliError> {
    let rows = scan_table(&config.data, &config.query.filter(), config.workers)?;
    for row in &rows {
        serde_json::to_writer(&mut *out, row).map_err(CliError::SerializeRow)?;
        writeln!(out).map_err(CliError::WriteOutput)?;
    }
    info!("{} matching rows in {}", rows.len(), config.data);
    Ok(rows.len())
}
