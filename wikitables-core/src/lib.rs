//! Core model for turning Wikidata entity records into relation tables.
//!
//! Responsibilities:
//! - Decode entity records from dump lines.
//! - Dispatch snak payloads by datatype.
//! - Map one record onto rows across the eight output tables.
//!
//! Boundaries:
//! - No I/O; reading dumps and writing tables live in `wikitables-data`.
//!
//! Invariants:
//! - Output depends only on the record and the [`TriplifyOptions`].
//! - Row identifiers are copied from the record, never generated.

#![forbid(unsafe_code)]

pub mod alias;
pub mod datatype;
pub mod entity;
pub mod table;
pub mod triplify;

pub use alias::{AliasProperties, DEFAULT_ALIAS_PROPERTIES};
pub use datatype::{Datatype, IGNORED_DATATYPES, Resolution};
pub use entity::{
    Claim, DataValue, EntityKind, EntityRecord, LanguageValue, Sitelink, Snak, SnakType,
};
pub use table::{
    AliasRow, ClaimRow, DescriptionRow, LabelRow, QualifierRow, Row, Table, TableRows,
    UnknownTableError, WikipediaLinkRow,
};
pub use triplify::{Triplified, TriplifyOptions, UnrecognisedSnak, triplify};
