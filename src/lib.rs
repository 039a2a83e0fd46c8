//! Facade crate for the wikitables triplifier.
//!
//! This crate re-exports the entity model and triplifier from
//! `wikitables-core` alongside the pipeline and table scanning entry points
//! from `wikitables-data`.
//!
//! # Examples
//! ```
//! use wikitables::{EntityRecord, Table, TriplifyOptions, triplify};
//!
//! let record: EntityRecord = serde_json::from_str(
//!     r#"{"id":"Q5","type":"item","labels":{"en":{"value":"Human"}}}"#,
//! )
//! .expect("valid record");
//! let out = triplify(&record, &TriplifyOptions::new("en"));
//! assert_eq!(out.rows.get(Table::Labels).len(), 1);
//! ```

#![forbid(unsafe_code)]

pub use wikitables_core::{
    AliasProperties, Claim, DataValue, Datatype, EntityKind, EntityRecord, Resolution, Row,
    Snak, Table, TableRows, Triplified, TriplifyOptions, UnrecognisedSnak, triplify,
};

pub use wikitables_data::{
    Pipeline, PipelineConfig, PipelineError, PipelineReport, RowFilter, ScanError, TableSink,
    scan_table,
};

#[cfg(feature = "test-support")]
pub use wikitables_data::test_support;
