//! Serde model for one line of a Wikidata JSON dump.
//!
//! Only the fields consumed by the triplifier are modelled. Everything else in
//! the record is ignored during decoding, which keeps per-line allocation low
//! on dumps with tens of millions of entities.

use std::{collections::BTreeMap, fmt, marker::PhantomData};

use serde::{
    Deserialize, Deserializer, Serialize,
    de::{self, IgnoredAny, MapAccess, SeqAccess, Visitor},
};

/// A decoded knowledge-base entity.
///
/// # Examples
/// ```
/// use wikitables_core::{EntityKind, EntityRecord};
///
/// let record: EntityRecord = serde_json::from_str(
///     r#"{"id":"Q42","type":"item","labels":{"en":{"language":"en","value":"Douglas Adams"}}}"#,
/// )?;
/// assert_eq!(record.kind, EntityKind::Item);
/// assert_eq!(record.label("en"), Some("Douglas Adams"));
/// # Ok::<(), serde_json::Error>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EntityRecord {
    /// Stable entity identifier (e.g., `Q42`).
    pub id: String,
    /// Whether the record is an item, a property, or something else.
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Labels keyed by language code.
    #[serde(default, deserialize_with = "lenient_map")]
    pub labels: BTreeMap<String, LanguageValue>,
    /// Descriptions keyed by language code.
    #[serde(default, deserialize_with = "lenient_map")]
    pub descriptions: BTreeMap<String, LanguageValue>,
    /// Aliases keyed by language code.
    #[serde(default, deserialize_with = "lenient_map")]
    pub aliases: BTreeMap<String, Vec<LanguageValue>>,
    /// Site links keyed by site identifier (e.g., `enwiki`).
    #[serde(default, deserialize_with = "lenient_map")]
    pub sitelinks: BTreeMap<String, Sitelink>,
    /// Claims keyed by property identifier.
    #[serde(default, deserialize_with = "lenient_map")]
    pub claims: BTreeMap<String, Vec<Claim>>,
}

impl EntityRecord {
    /// Return the label for `language`, if present.
    #[must_use]
    pub fn label(&self, language: &str) -> Option<&str> {
        self.labels.get(language).map(|entry| entry.value.as_str())
    }
}

/// Kind of entity stored in the dump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// A regular item (`Q…`).
    Item,
    /// A property definition (`P…`).
    Property,
    /// Lexemes, media info, and any other entity types.
    #[serde(other)]
    Other,
}

/// A language-tagged text value.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LanguageValue {
    /// The text itself.
    pub value: String,
}

/// A link from the entity to a page on a wiki site.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Sitelink {
    /// Title of the linked page.
    pub title: String,
}

/// A single statement about the entity.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Claim {
    /// Statement identifier (e.g., `Q42$1d7d0ea9-412f-8b5b-ba8d-405ab9ecf026`).
    pub id: String,
    /// The primary value assertion.
    pub mainsnak: Snak,
    /// Qualifier snaks keyed by qualifier property.
    #[serde(default, deserialize_with = "lenient_map")]
    pub qualifiers: BTreeMap<String, Vec<Snak>>,
}

/// A value container used for main snaks and qualifiers alike.
///
/// The payload stays untyped so unrecognised snaks can be written back out
/// verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Snak {
    /// Whether the snak carries a concrete value.
    pub snaktype: SnakType,
    /// Property the snak belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub property: Option<String>,
    /// Content hash, used as the identifier of qualifier snaks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    /// Declared datatype name (e.g., `wikibase-item`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
    /// The value payload, absent for `somevalue`/`novalue` snaks.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datavalue: Option<DataValue>,
}

/// The `datavalue` object of a snak.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct DataValue {
    /// Raw JSON value; its shape depends on the snak datatype.
    pub value: serde_json::Value,
    /// Value type tag (e.g., `wikibase-entityid`).
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

/// Whether a snak carries a concrete value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SnakType {
    /// A concrete value is present.
    Value,
    /// Some unknown value exists.
    Somevalue,
    /// The property explicitly has no value.
    Novalue,
}

/// Dumps serialise empty maps as `[]`; accept both shapes (and `null`).
fn lenient_map<'de, D, T>(deserializer: D) -> Result<BTreeMap<String, T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    deserializer.deserialize_any(LenientMapVisitor(PhantomData))
}

struct LenientMapVisitor<T>(PhantomData<T>);

impl<'de, T> Visitor<'de> for LenientMapVisitor<T>
where
    T: Deserialize<'de>,
{
    type Value = BTreeMap<String, T>;

    fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter.write_str("a map or an empty array")
    }

    fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        let mut entries = BTreeMap::new();
        while let Some((key, value)) = access.next_entry::<String, T>()? {
            entries.insert(key, value);
        }
        Ok(entries)
    }

    fn visit_seq<A>(self, mut access: A) -> Result<Self::Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        if access.next_element::<IgnoredAny>()?.is_some() {
            return Err(de::Error::invalid_length(1, &self));
        }
        Ok(BTreeMap::new())
    }

    fn visit_unit<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(BTreeMap::new())
    }

    fn visit_none<E>(self) -> Result<Self::Value, E>
    where
        E: de::Error,
    {
        Ok(BTreeMap::new())
    }
}
