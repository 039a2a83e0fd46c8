//! Output tables and their row schemas.
//!
//! # Examples
//! ```
//! use wikitables_core::Table;
//!
//! assert_eq!(Table::EntityRels.as_str(), "entity_rels");
//! assert_eq!("wikipedia_links".parse::<Table>(), Ok(Table::WikipediaLinks));
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One of the eight relation tables produced from a dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Table {
    /// Entity labels in the configured language.
    Labels,
    /// Entity descriptions in the configured language.
    Descriptions,
    /// Aliases, including labels and alias-bearing claim values.
    Aliases,
    /// Claims whose value is another item.
    EntityRels,
    /// Claims whose value is an external identifier.
    ExternalIds,
    /// Claims whose value is any other literal.
    EntityValues,
    /// Qualifier values attached to claims.
    Qualifiers,
    /// Page titles on the configured language's Wikipedia.
    WikipediaLinks,
}

impl Table {
    /// Every table, in output order.
    pub const ALL: [Self; 8] = [
        Self::Labels,
        Self::Descriptions,
        Self::Aliases,
        Self::EntityRels,
        Self::ExternalIds,
        Self::EntityValues,
        Self::Qualifiers,
        Self::WikipediaLinks,
    ];

    /// Return the table name, which is also its directory name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Labels => "labels",
            Self::Descriptions => "descriptions",
            Self::Aliases => "aliases",
            Self::EntityRels => "entity_rels",
            Self::ExternalIds => "external_ids",
            Self::EntityValues => "entity_values",
            Self::Qualifiers => "qualifiers",
            Self::WikipediaLinks => "wikipedia_links",
        }
    }
}

impl std::fmt::Display for Table {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown table name.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown table '{name}'")]
pub struct UnknownTableError {
    /// The name that failed to parse.
    pub name: String,
}

impl std::str::FromStr for Table {
    type Err = UnknownTableError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|table| table.as_str() == lowered)
            .ok_or_else(|| UnknownTableError { name: s.to_owned() })
    }
}

/// Row of the `labels` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelRow {
    /// Owning entity.
    pub entity_id: String,
    /// Label text.
    pub label: String,
}

/// Row of the `descriptions` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DescriptionRow {
    /// Owning entity.
    pub entity_id: String,
    /// Description text.
    pub description: String,
}

/// Row of the `aliases` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AliasRow {
    /// Owning entity.
    pub entity_id: String,
    /// Alias text.
    pub alias: String,
}

/// Row shared by `entity_rels`, `external_ids`, and `entity_values`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClaimRow {
    /// Claim identifier.
    pub claim_id: String,
    /// Subject entity.
    pub entity_id: String,
    /// Claim property.
    pub property_id: String,
    /// Resolved value: an entity id, an external id, or a literal.
    pub value: String,
}

/// Row of the `qualifiers` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QualifierRow {
    /// Hash of the qualifier snak.
    pub qualifier_id: String,
    /// Claim the qualifier belongs to.
    pub claim_id: String,
    /// Qualifier property.
    pub property_id: String,
    /// Resolved qualifier value.
    pub value: String,
}

/// Row of the `wikipedia_links` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WikipediaLinkRow {
    /// Owning entity.
    pub entity_id: String,
    /// Title of the Wikipedia page.
    pub wiki_title: String,
}

/// Any output row; serialises as the bare row object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum Row {
    /// A `labels` row.
    Label(LabelRow),
    /// A `descriptions` row.
    Description(DescriptionRow),
    /// An `aliases` row.
    Alias(AliasRow),
    /// An `entity_rels`, `external_ids`, or `entity_values` row.
    Claim(ClaimRow),
    /// A `qualifiers` row.
    Qualifier(QualifierRow),
    /// A `wikipedia_links` row.
    WikipediaLink(WikipediaLinkRow),
}

/// Rows grouped by table, preserving insertion order within each table.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TableRows {
    tables: BTreeMap<Table, Vec<Row>>,
}

impl TableRows {
    /// Append one row to `table`.
    pub fn push(&mut self, table: Table, row: Row) {
        self.tables.entry(table).or_default().push(row);
    }

    /// Concatenate `other` onto `self`, table by table.
    pub fn extend(&mut self, other: Self) {
        for (table, rows) in other.tables {
            self.tables.entry(table).or_default().extend(rows);
        }
    }

    /// Rows recorded for `table`; empty when none were recorded.
    #[must_use]
    pub fn get(&self, table: Table) -> &[Row] {
        self.tables.get(&table).map_or(&[][..], Vec::as_slice)
    }

    /// Iterate over non-empty tables in [`Table`] order.
    pub fn iter(&self) -> impl Iterator<Item = (Table, &[Row])> {
        self.tables
            .iter()
            .filter(|(_, rows)| !rows.is_empty())
            .map(|(table, rows)| (*table, rows.as_slice()))
    }

    /// Total number of rows across all tables.
    #[must_use]
    pub fn row_count(&self) -> usize {
        self.tables.values().map(Vec::len).sum()
    }

    /// Whether no rows were recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }
}
