//! Transform one entity record into rows across the output tables.
//!
//! [`triplify`] is pure: it performs no I/O and its output depends only on
//! the record and the [`TriplifyOptions`]. Unrecognised datatypes are returned
//! alongside the rows so the caller decides where to log them.

use serde::Serialize;

use crate::{
    alias::AliasProperties,
    datatype::{Datatype, Resolution},
    entity::{Claim, EntityKind, EntityRecord, Snak, SnakType},
    table::{
        AliasRow, ClaimRow, DescriptionRow, LabelRow, QualifierRow, Row, Table, TableRows,
        WikipediaLinkRow,
    },
};

/// Settings shared by every call to [`triplify`] in a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TriplifyOptions {
    language: String,
    alias_properties: AliasProperties,
}

impl TriplifyOptions {
    /// Options for `language` with the default alias-bearing properties.
    #[must_use]
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            alias_properties: AliasProperties::default(),
        }
    }

    /// Replace the alias-bearing property set.
    #[must_use]
    pub fn with_alias_properties(mut self, alias_properties: AliasProperties) -> Self {
        self.alias_properties = alias_properties;
        self
    }

    /// Target language code (e.g., `en`).
    #[must_use]
    pub fn language(&self) -> &str {
        &self.language
    }

    /// Properties whose values also become aliases.
    #[must_use]
    pub const fn alias_properties(&self) -> &AliasProperties {
        &self.alias_properties
    }
}

/// A snak whose datatype is neither handled nor ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnrecognisedSnak {
    /// Entity the snak was found on.
    pub entity_id: String,
    /// The unknown datatype name; empty when the snak declared none.
    pub datatype: String,
    /// The snak exactly as decoded.
    pub payload: Snak,
}

/// Result of triplifying one record.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Triplified {
    /// Rows grouped by table.
    pub rows: TableRows,
    /// Snaks that could not be classified.
    pub unrecognised: Vec<UnrecognisedSnak>,
}

impl Triplified {
    /// Merge `other` into `self`, keeping per-table order.
    pub fn extend(&mut self, other: Self) {
        self.rows.extend(other.rows);
        self.unrecognised.extend(other.unrecognised);
    }
}

/// Produce the table rows for `record`.
///
/// Only items are triplified; properties and other entity kinds yield an
/// empty result.
///
/// # Examples
/// ```
/// use wikitables_core::{EntityRecord, Table, TriplifyOptions, triplify};
///
/// let record: EntityRecord = serde_json::from_str(
///     r#"{"id":"Q5","type":"item","labels":{"en":{"value":"Human"}}}"#,
/// )?;
/// let out = triplify(&record, &TriplifyOptions::new("en"));
/// assert_eq!(out.rows.get(Table::Labels).len(), 1);
/// assert_eq!(out.rows.get(Table::Aliases).len(), 1);
/// # Ok::<(), serde_json::Error>(())
/// ```
#[must_use]
pub fn triplify(record: &EntityRecord, options: &TriplifyOptions) -> Triplified {
    let mut out = Triplified::default();
    if record.kind != EntityKind::Item {
        return out;
    }
    let entity_id = record.id.as_str();
    let language = options.language();

    if let Some(label) = record.label(language) {
        out.rows.push(Table::Labels, label_row(entity_id, label));
        out.rows.push(Table::Aliases, alias_row(entity_id, label));
    }
    if let Some(description) = record.descriptions.get(language) {
        out.rows.push(
            Table::Descriptions,
            Row::Description(DescriptionRow {
                entity_id: entity_id.to_owned(),
                description: description.value.clone(),
            }),
        );
    }
    for alias in record.aliases.get(language).into_iter().flatten() {
        out.rows.push(Table::Aliases, alias_row(entity_id, &alias.value));
    }
    if let Some(sitelink) = record.sitelinks.get(&format!("{language}wiki")) {
        out.rows.push(
            Table::WikipediaLinks,
            Row::WikipediaLink(WikipediaLinkRow {
                entity_id: entity_id.to_owned(),
                wiki_title: sitelink.title.clone(),
            }),
        );
    }

    for (property_id, claims) in &record.claims {
        for claim in claims {
            triplify_claim(entity_id, property_id, claim, options, &mut out);
        }
    }
    out
}

fn triplify_claim(
    entity_id: &str,
    property_id: &str,
    claim: &Claim,
    options: &TriplifyOptions,
    out: &mut Triplified,
) {
    let Some((datatype, value)) = resolve_snak(entity_id, &claim.mainsnak, options, out) else {
        return;
    };
    let table = match datatype {
        Datatype::WikibaseItem => Table::EntityRels,
        Datatype::ExternalId => Table::ExternalIds,
        _ => Table::EntityValues,
    };
    // Item and identifier values are not names.
    if table == Table::EntityValues && options.alias_properties().contains(property_id) {
        out.rows.push(Table::Aliases, alias_row(entity_id, &value));
    }
    out.rows.push(
        table,
        Row::Claim(ClaimRow {
            claim_id: claim.id.clone(),
            entity_id: entity_id.to_owned(),
            property_id: property_id.to_owned(),
            value,
        }),
    );

    for (qualifier_property, snaks) in &claim.qualifiers {
        for snak in snaks {
            let Some((_, qualifier_value)) = resolve_snak(entity_id, snak, options, out) else {
                continue;
            };
            let Some(hash) = &snak.hash else {
                continue;
            };
            out.rows.push(
                Table::Qualifiers,
                Row::Qualifier(QualifierRow {
                    qualifier_id: hash.clone(),
                    claim_id: claim.id.clone(),
                    property_id: qualifier_property.clone(),
                    value: qualifier_value,
                }),
            );
        }
    }
}

/// Resolve a value snak, recording it when its datatype is unknown.
fn resolve_snak(
    entity_id: &str,
    snak: &Snak,
    options: &TriplifyOptions,
    out: &mut Triplified,
) -> Option<(Datatype, String)> {
    if snak.snaktype != SnakType::Value {
        return None;
    }
    let datatype = Datatype::from_name(snak.datatype.as_deref());
    let payload = snak.datavalue.as_ref().map(|datavalue| &datavalue.value);
    match datatype.resolve(payload, options.language()) {
        Resolution::Value(value) => Some((datatype, value)),
        Resolution::NoValue => None,
        Resolution::Unrecognised => {
            out.unrecognised.push(UnrecognisedSnak {
                entity_id: entity_id.to_owned(),
                datatype: datatype.name().to_owned(),
                payload: snak.clone(),
            });
            None
        }
    }
}

fn label_row(entity_id: &str, label: &str) -> Row {
    Row::Label(LabelRow {
        entity_id: entity_id.to_owned(),
        label: label.to_owned(),
    })
}

fn alias_row(entity_id: &str, alias: &str) -> Row {
    Row::Alias(AliasRow {
        entity_id: entity_id.to_owned(),
        alias: alias.to_owned(),
    })
}

#[cfg(test)]
mod tests;
