//! Properties whose claim values name the subject entity.

use std::collections::BTreeSet;

/// Default alias-bearing properties (birth names, nicknames, official names,
/// short names, and similar).
pub const DEFAULT_ALIAS_PROPERTIES: [&str; 37] = [
    "P138", "P734", "P735", "P742", "P1448", "P1449", "P1477", "P1533", "P1549", "P1559", "P1560",
    "P1635", "P1705", "P1782", "P1785", "P1786", "P1787", "P1810", "P1813", "P1814", "P1888",
    "P1950", "P2358", "P2359", "P2365", "P2366", "P2521", "P2562", "P2976", "P3321", "P4239",
    "P4284", "P4970", "P5056", "P5278", "P6978", "P7383",
];

/// Set of property identifiers whose resolved claim values also count as
/// aliases of the subject.
///
/// # Examples
/// ```
/// use wikitables_core::AliasProperties;
///
/// let defaults = AliasProperties::default();
/// assert!(defaults.contains("P1449"));
///
/// let custom = AliasProperties::parse_list(" P1, P2 ,,P3");
/// assert_eq!(custom.len(), 3);
/// assert!(!custom.contains("P1449"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AliasProperties {
    properties: BTreeSet<String>,
}

impl AliasProperties {
    /// An empty set; no claim produces alias rows.
    #[must_use]
    pub const fn none() -> Self {
        Self {
            properties: BTreeSet::new(),
        }
    }

    /// Parse a comma-separated list, ignoring blanks and surrounding space.
    #[must_use]
    pub fn parse_list(list: &str) -> Self {
        list.split(',')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .collect()
    }

    /// Whether `property_id` is alias-bearing.
    #[must_use]
    pub fn contains(&self, property_id: &str) -> bool {
        self.properties.contains(property_id)
    }

    /// Number of properties in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.properties.len()
    }

    /// Whether the set is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.properties.is_empty()
    }

    /// Iterate over the properties in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.properties.iter().map(String::as_str)
    }
}

impl Default for AliasProperties {
    fn default() -> Self {
        DEFAULT_ALIAS_PROPERTIES.into_iter().collect()
    }
}

impl<S> FromIterator<S> for AliasProperties
where
    S: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self {
            properties: iter.into_iter().map(Into::into).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn defaults_cover_every_listed_property() {
        let defaults = AliasProperties::default();
        assert_eq!(defaults.len(), DEFAULT_ALIAS_PROPERTIES.len());
        assert!(defaults.iter().all(|property| property.starts_with('P')));
    }

    #[rstest]
    fn empty_list_parses_to_empty_set() {
        assert!(AliasProperties::parse_list(" , ").is_empty());
        assert_eq!(AliasProperties::parse_list(""), AliasProperties::none());
    }
}
