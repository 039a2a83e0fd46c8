//! Datatype dispatch for snak payloads.
//!
//! Every datatype name found in a dump maps onto exactly one [`Datatype`]
//! variant. Known datatypes resolve to a flat string, datatypes in
//! [`IGNORED_DATATYPES`] quietly resolve to nothing, and anything else is
//! reported as [`Resolution::Unrecognised`] so the caller can log the raw
//! payload.

use serde_json::Value;

/// Datatypes that carry no value worth tabulating.
pub const IGNORED_DATATYPES: [&str; 9] = [
    "wikibase-lexeme",
    "musical-notation",
    "globe-coordinate",
    "commonsMedia",
    "geo-shape",
    "wikibase-sense",
    "wikibase-property",
    "math",
    "tabular-data",
];

/// Snak datatype as declared in the dump.
///
/// # Examples
/// ```
/// use wikitables_core::{Datatype, Resolution};
///
/// let datatype = Datatype::from_name(Some("quantity"));
/// let payload = serde_json::json!({"amount": "+1.50", "unit": "1"});
/// assert_eq!(
///     datatype.resolve(Some(&payload), "en"),
///     Resolution::Value("+1.50".to_owned()),
/// );
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Datatype {
    /// Plain string.
    String,
    /// Language-tagged text.
    MonolingualText,
    /// Numeric amount, kept verbatim.
    Quantity,
    /// Point in time, kept verbatim.
    Time,
    /// Reference to another item.
    WikibaseItem,
    /// Identifier in an external database.
    ExternalId,
    /// URL.
    Url,
    /// A datatype deliberately left out of the tables.
    Ignored(&'static str),
    /// A datatype this crate does not know about.
    Unknown(String),
}

/// Outcome of resolving a snak payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// The payload resolved to a usable value.
    Value(String),
    /// No usable value: ignored datatype, language mismatch, or a payload
    /// whose shape does not match its datatype.
    NoValue,
    /// The datatype is unknown and the payload should be logged.
    Unrecognised,
}

impl Datatype {
    /// Classify a datatype name. A missing name is treated as unknown.
    #[must_use]
    pub fn from_name(declared: Option<&str>) -> Self {
        let Some(name) = declared else {
            return Self::Unknown(String::new());
        };
        match name {
            "string" => Self::String,
            "monolingualtext" => Self::MonolingualText,
            "quantity" => Self::Quantity,
            "time" => Self::Time,
            "wikibase-item" => Self::WikibaseItem,
            "external-id" => Self::ExternalId,
            "url" => Self::Url,
            other => IGNORED_DATATYPES
                .into_iter()
                .find(|ignored| *ignored == other)
                .map_or_else(|| Self::Unknown(other.to_owned()), Self::Ignored),
        }
    }

    /// Name of the datatype as it appears in the dump.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::String => "string",
            Self::MonolingualText => "monolingualtext",
            Self::Quantity => "quantity",
            Self::Time => "time",
            Self::WikibaseItem => "wikibase-item",
            Self::ExternalId => "external-id",
            Self::Url => "url",
            Self::Ignored(name) => *name,
            Self::Unknown(name) => name.as_str(),
        }
    }

    /// Resolve `value` into a flat string according to the datatype.
    ///
    /// `language` filters monolingual text: text in any other language
    /// resolves to [`Resolution::NoValue`].
    #[must_use]
    pub fn resolve(&self, value: Option<&Value>, language: &str) -> Resolution {
        let resolved = match self {
            Self::Ignored(_) => None,
            Self::Unknown(_) => return Resolution::Unrecognised,
            Self::String | Self::ExternalId | Self::Url => value.and_then(as_text),
            Self::MonolingualText => value.and_then(|payload| monolingual_text(payload, language)),
            Self::Quantity => value.and_then(|payload| field_text(payload, "amount")),
            Self::Time => value.and_then(|payload| field_text(payload, "time")),
            Self::WikibaseItem => value.and_then(item_id),
        };
        resolved.map_or(Resolution::NoValue, Resolution::Value)
    }
}

fn as_text(value: &Value) -> Option<String> {
    value.as_str().map(str::to_owned)
}

fn field_text(value: &Value, field: &str) -> Option<String> {
    value.get(field).and_then(as_text)
}

fn monolingual_text(value: &Value, language: &str) -> Option<String> {
    let tag = value.get("language").and_then(Value::as_str)?;
    if tag != language {
        return None;
    }
    field_text(value, "text")
}

fn item_id(value: &Value) -> Option<String> {
    if let Some(id) = field_text(value, "id") {
        return Some(id);
    }
    // Older dumps only carry the numeric form.
    value
        .get("numeric-id")
        .and_then(Value::as_u64)
        .map(|numeric| format!("Q{numeric}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    #[case("string", json!("abc"), "abc")]
    #[case("external-id", json!("0000-0001"), "0000-0001")]
    #[case("url", json!("https://example.org"), "https://example.org")]
    #[case("quantity", json!({"amount": "+12345678901234567890.5", "unit": "1"}), "+12345678901234567890.5")]
    #[case("time", json!({"time": "+1952-03-11T00:00:00Z", "precision": 11}), "+1952-03-11T00:00:00Z")]
    #[case("wikibase-item", json!({"entity-type": "item", "numeric-id": 5, "id": "Q5"}), "Q5")]
    #[case("wikibase-item", json!({"entity-type": "item", "numeric-id": 42}), "Q42")]
    #[case("monolingualtext", json!({"text": "Douglas", "language": "en"}), "Douglas")]
    fn resolves_known_datatypes(#[case] name: &str, #[case] payload: Value, #[case] expected: &str) {
        let datatype = Datatype::from_name(Some(name));
        assert_eq!(
            datatype.resolve(Some(&payload), "en"),
            Resolution::Value(expected.to_owned())
        );
        assert_eq!(datatype.name(), name);
    }

    #[rstest]
    fn monolingual_text_in_other_language_has_no_value() {
        let payload = json!({"text": "Duglas", "language": "de"});
        assert_eq!(
            Datatype::MonolingualText.resolve(Some(&payload), "en"),
            Resolution::NoValue
        );
    }

    #[rstest]
    fn every_ignored_datatype_has_no_value() {
        for name in IGNORED_DATATYPES {
            let datatype = Datatype::from_name(Some(name));
            assert_eq!(datatype, Datatype::Ignored(name));
            assert_eq!(datatype.resolve(Some(&json!("x")), "en"), Resolution::NoValue);
        }
    }

    #[rstest]
    #[case(Some("entity-schema"))]
    #[case(None)]
    fn unknown_datatypes_are_unrecognised(#[case] name: Option<&str>) {
        let datatype = Datatype::from_name(name);
        assert!(matches!(datatype, Datatype::Unknown(_)));
        assert_eq!(datatype.resolve(None, "en"), Resolution::Unrecognised);
    }

    #[rstest]
    #[case("quantity", json!("not an object"))]
    #[case("string", json!({"unexpected": true}))]
    #[case("wikibase-item", json!({"entity-type": "item"}))]
    fn mismatched_payload_shapes_have_no_value(#[case] name: &str, #[case] payload: Value) {
        let datatype = Datatype::from_name(Some(name));
        assert_eq!(datatype.resolve(Some(&payload), "en"), Resolution::NoValue);
    }

    #[rstest]
    fn missing_payload_has_no_value() {
        assert_eq!(Datatype::String.resolve(None, "en"), Resolution::NoValue);
    }
}
