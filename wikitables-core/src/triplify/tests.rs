//! Unit tests for record triplification.

use super::*;
use rstest::{fixture, rstest};
use serde_json::{Value, json};

fn record(value: Value) -> EntityRecord {
    serde_json::from_value(value).expect("fixture record should decode")
}

fn claim_rows(out: &Triplified, table: Table) -> Vec<&ClaimRow> {
    out.rows
        .get(table)
        .iter()
        .filter_map(|row| match row {
            Row::Claim(claim) => Some(claim),
            _ => None,
        })
        .collect()
}

fn aliases(out: &Triplified) -> Vec<&str> {
    out.rows
        .get(Table::Aliases)
        .iter()
        .filter_map(|row| match row {
            Row::Alias(alias) => Some(alias.alias.as_str()),
            _ => None,
        })
        .collect()
}

#[fixture]
fn options() -> TriplifyOptions {
    TriplifyOptions::new("en")
}

#[fixture]
fn human() -> EntityRecord {
    record(json!({
        "id": "Q5",
        "type": "item",
        "labels": {"en": {"language": "en", "value": "Human"}},
        "claims": {
            "P31": [{
                "id": "c1",
                "mainsnak": {
                    "snaktype": "value",
                    "datatype": "wikibase-item",
                    "datavalue": {"value": {"id": "Q5"}}
                }
            }]
        }
    }))
}

#[rstest]
fn human_record_yields_label_alias_and_relation(human: EntityRecord, options: TriplifyOptions) {
    let out = triplify(&human, &options);

    assert_eq!(
        out.rows.get(Table::Labels),
        &[Row::Label(LabelRow {
            entity_id: "Q5".into(),
            label: "Human".into(),
        })]
    );
    assert_eq!(aliases(&out), vec!["Human"]);
    assert_eq!(
        claim_rows(&out, Table::EntityRels),
        vec![&ClaimRow {
            claim_id: "c1".into(),
            entity_id: "Q5".into(),
            property_id: "P31".into(),
            value: "Q5".into(),
        }]
    );
    assert_eq!(out.rows.row_count(), 3);
    assert!(out.unrecognised.is_empty());
}

#[rstest]
#[case("property")]
#[case("lexeme")]
fn non_items_yield_nothing(#[case] kind: &str, options: TriplifyOptions) {
    let input = record(json!({
        "id": "P31",
        "type": kind,
        "labels": {"en": {"value": "instance of"}},
        "descriptions": {"en": {"value": "that class of which this subject is a particular example"}}
    }));
    let out = triplify(&input, &options);
    assert!(out.rows.is_empty());
    assert!(out.unrecognised.is_empty());
}

#[rstest]
fn language_fields_follow_the_configured_language(options: TriplifyOptions) {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "labels": {"en": {"value": "Douglas Adams"}, "fr": {"value": "Douglas Adams (fr)"}},
        "descriptions": {"en": {"value": "English writer"}, "de": {"value": "Schriftsteller"}},
        "aliases": {"en": [{"value": "DNA"}, {"value": "Douglas Noel Adams"}], "de": [{"value": "DA"}]},
        "sitelinks": {"enwiki": {"site": "enwiki", "title": "Douglas Adams"}, "dewiki": {"title": "Douglas Adams (de)"}}
    }));
    let out = triplify(&input, &options);

    assert_eq!(aliases(&out), vec!["Douglas Adams", "DNA", "Douglas Noel Adams"]);
    assert_eq!(
        out.rows.get(Table::Descriptions),
        &[Row::Description(DescriptionRow {
            entity_id: "Q42".into(),
            description: "English writer".into(),
        })]
    );
    assert_eq!(
        out.rows.get(Table::WikipediaLinks),
        &[Row::WikipediaLink(WikipediaLinkRow {
            entity_id: "Q42".into(),
            wiki_title: "Douglas Adams".into(),
        })]
    );
}

#[rstest]
fn record_without_target_language_yields_no_language_rows() {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "labels": {"en": {"value": "Douglas Adams"}},
        "sitelinks": {"enwiki": {"title": "Douglas Adams"}}
    }));
    let out = triplify(&input, &TriplifyOptions::new("fr"));
    assert!(out.rows.is_empty());
}

#[rstest]
#[case("external-id", json!("0000-0001-2345-6789"), Table::ExternalIds, "0000-0001-2345-6789")]
#[case("string", json!("Adams"), Table::EntityValues, "Adams")]
#[case("url", json!("https://example.org"), Table::EntityValues, "https://example.org")]
#[case("quantity", json!({"amount": "+42", "unit": "1"}), Table::EntityValues, "+42")]
#[case("time", json!({"time": "+2001-05-11T00:00:00Z"}), Table::EntityValues, "+2001-05-11T00:00:00Z")]
#[case("monolingualtext", json!({"text": "DNA", "language": "en"}), Table::EntityValues, "DNA")]
fn claims_route_by_datatype(
    options: TriplifyOptions,
    #[case] datatype: &str,
    #[case] value: Value,
    #[case] table: Table,
    #[case] expected: &str,
) {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "claims": {"P9": [{
            "id": "c9",
            "mainsnak": {"snaktype": "value", "datatype": datatype, "datavalue": {"value": value}}
        }]}
    }));
    let out = triplify(&input, &options);
    let rows = claim_rows(&out, table);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows.first().map(|row| row.value.as_str()), Some(expected));
    assert_eq!(out.rows.row_count(), 1);
}

#[rstest]
#[case("somevalue")]
#[case("novalue")]
fn non_value_claims_drop_their_qualifiers(options: TriplifyOptions, #[case] snaktype: &str) {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "claims": {"P569": [{
            "id": "c1",
            "mainsnak": {"snaktype": snaktype, "datatype": "time"},
            "qualifiers": {"P1480": [{
                "snaktype": "value",
                "hash": "h1",
                "datatype": "wikibase-item",
                "datavalue": {"value": {"id": "Q5727902"}}
            }]}
        }]}
    }));
    let out = triplify(&input, &options);
    assert!(out.rows.is_empty());
}

#[rstest]
fn monolingual_claim_in_other_language_is_skipped(options: TriplifyOptions) {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "claims": {"P1477": [{
            "id": "c1",
            "mainsnak": {
                "snaktype": "value",
                "datatype": "monolingualtext",
                "datavalue": {"value": {"text": "Duglas", "language": "de"}}
            }
        }]}
    }));
    let out = triplify(&input, &options);
    assert!(out.rows.is_empty());
}

#[rstest]
fn alias_bearing_claims_also_emit_aliases(options: TriplifyOptions) {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "claims": {"P1449": [{
            "id": "c1",
            "mainsnak": {
                "snaktype": "value",
                "datatype": "monolingualtext",
                "datavalue": {"value": {"text": "Bop Ad", "language": "en"}}
            }
        }]}
    }));
    let out = triplify(&input, &options);
    assert_eq!(aliases(&out), vec!["Bop Ad"]);
    assert_eq!(claim_rows(&out, Table::EntityValues).len(), 1);

    let without = TriplifyOptions::new("en").with_alias_properties(AliasProperties::none());
    assert!(aliases(&triplify(&input, &without)).is_empty());
}

#[rstest]
#[case("P735", "wikibase-item", json!({"id": "Q463035"}), Table::EntityRels)]
#[case("P1449", "external-id", json!("nm0010930"), Table::ExternalIds)]
fn alias_bearing_claims_with_item_or_identifier_values_add_no_aliases(
    options: TriplifyOptions,
    #[case] property: &str,
    #[case] datatype: &str,
    #[case] value: Value,
    #[case] table: Table,
) {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "claims": {property: [{
            "id": "c1",
            "mainsnak": {
                "snaktype": "value",
                "datatype": datatype,
                "datavalue": {"value": value}
            }
        }]}
    }));
    assert!(options.alias_properties().contains(property));

    let out = triplify(&input, &options);
    assert!(aliases(&out).is_empty(), "unexpected aliases {:?}", aliases(&out));
    assert_eq!(claim_rows(&out, table).len(), 1);
}

#[rstest]
fn qualifiers_are_keyed_by_hash_and_parent_claim(options: TriplifyOptions) {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "claims": {"P69": [{
            "id": "c1",
            "mainsnak": {
                "snaktype": "value",
                "datatype": "wikibase-item",
                "datavalue": {"value": {"id": "Q691283"}}
            },
            "qualifiers": {
                "P582": [{
                    "snaktype": "value",
                    "property": "P582",
                    "hash": "q-end",
                    "datatype": "time",
                    "datavalue": {"value": {"time": "+1974-01-01T00:00:00Z"}}
                }],
                "P512": [
                    {"snaktype": "value", "datatype": "wikibase-item", "datavalue": {"value": {"id": "Q1765120"}}},
                    {"snaktype": "novalue", "hash": "q-none", "datatype": "wikibase-item"}
                ]
            }
        }]}
    }));
    let out = triplify(&input, &options);
    assert_eq!(
        out.rows.get(Table::Qualifiers),
        &[Row::Qualifier(QualifierRow {
            qualifier_id: "q-end".into(),
            claim_id: "c1".into(),
            property_id: "P582".into(),
            value: "+1974-01-01T00:00:00Z".into(),
        })]
    );
}

#[rstest]
fn unknown_datatypes_are_recorded_not_emitted(options: TriplifyOptions) {
    let input = record(json!({
        "id": "Q42",
        "type": "item",
        "claims": {
            "P1": [{"id": "c1", "mainsnak": {"snaktype": "value", "datatype": "entity-schema", "datavalue": {"value": {"id": "E10"}}}}],
            "P2": [{"id": "c2", "mainsnak": {"snaktype": "value", "datatype": "commonsMedia", "datavalue": {"value": "a.jpg"}}}],
            "P3": [{
                "id": "c3",
                "mainsnak": {"snaktype": "value", "datatype": "string", "datavalue": {"value": "x"}},
                "qualifiers": {"P4": [{"snaktype": "value", "hash": "h", "datatype": "wikibase-form", "datavalue": {"value": {"id": "L1-F1"}}}]}
            }]
        }
    }));
    let out = triplify(&input, &options);

    let datatypes: Vec<&str> = out
        .unrecognised
        .iter()
        .map(|snak| snak.datatype.as_str())
        .collect();
    assert_eq!(datatypes, vec!["entity-schema", "wikibase-form"]);
    assert!(out.unrecognised.iter().all(|snak| snak.entity_id == "Q42"));
    assert_eq!(claim_rows(&out, Table::EntityValues).len(), 1);
    assert!(out.rows.get(Table::Qualifiers).is_empty());
}

#[rstest]
fn triplify_is_idempotent(human: EntityRecord, options: TriplifyOptions) {
    assert_eq!(triplify(&human, &options), triplify(&human, &options));
}
