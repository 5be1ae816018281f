//! The dictionary definition format.
//!
//! A definition is a named, ordered list of groups. Each group belongs to a
//! category and maps every dictionary key to the terms it contributes:
//!
//! ```json
//! {
//!   "name": "Gendered terms",
//!   "terms": [
//!     {
//!       "category": "Pronouns: whose",
//!       "ambiguous": true,
//!       "terms": { "men": ["his"], "women": ["hers", "her"] }
//!     }
//!   ]
//! }
//! ```
//!
//! Key order inside `terms` is significant (it drives registration order in
//! the [`TermStore`](crate::TermStore)), so groups keep their keys in a `Vec`
//! rather than a hash map.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::DictionaryError;

/// A complete dictionary definition, as loaded from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryDefinition {
    /// Human-readable dictionary name.
    pub name: String,
    /// Definition groups, in load order.
    #[serde(default)]
    pub terms: Vec<DefinitionGroup>,
}

impl DictionaryDefinition {
    /// Creates a definition from its parts.
    pub fn new(name: impl Into<String>, terms: Vec<DefinitionGroup>) -> Self {
        Self {
            name: name.into(),
            terms,
        }
    }

    /// Parses a definition from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        let definition = serde_json::from_str(json)?;
        Ok(definition)
    }

    /// Reads and parses a definition from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }
}

/// One category of linked terms.
///
/// Every key in the group is cross-linked to every other key of the same
/// group; terms are never linked to their own key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefinitionGroup {
    /// Category label (informational).
    #[serde(default)]
    pub category: String,
    /// Which keys of this group produce ambiguous replacements.
    #[serde(default, skip_serializing_if = "Ambiguity::is_unset")]
    pub ambiguous: Ambiguity,
    /// Terms per key, in declaration order.
    #[serde(with = "ordered_terms")]
    pub terms: Vec<(String, Vec<String>)>,
}

impl DefinitionGroup {
    /// Creates a non-ambiguous group from `(key, terms)` pairs.
    pub fn new<K, T, S>(category: impl Into<String>, terms: impl IntoIterator<Item = (K, T)>) -> Self
    where
        K: Into<String>,
        T: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            category: category.into(),
            ambiguous: Ambiguity::default(),
            terms: terms
                .into_iter()
                .map(|(key, list)| (key.into(), list.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Sets the ambiguity declaration.
    pub fn with_ambiguity(mut self, ambiguous: Ambiguity) -> Self {
        self.ambiguous = ambiguous;
        self
    }
}

/// Ambiguity declaration of a definition group.
///
/// Evaluated separately for each key while the group is indexed: a boolean
/// applies to every key, a key name or list of key names applies only to the
/// listed keys. Key names compare case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ambiguity {
    /// Applies to every key of the group (or none).
    Flag(bool),
    /// Applies to a single key.
    Key(String),
    /// Applies to each listed key.
    Keys(Vec<String>),
}

impl Default for Ambiguity {
    fn default() -> Self {
        Ambiguity::Flag(false)
    }
}

impl Ambiguity {
    /// Returns `true` if terms indexed under `key` are ambiguous.
    pub fn applies_to(&self, key: &str) -> bool {
        match self {
            Ambiguity::Flag(flag) => *flag,
            Ambiguity::Key(k) => k.to_lowercase() == key.to_lowercase(),
            Ambiguity::Keys(keys) => keys.iter().any(|k| k.to_lowercase() == key.to_lowercase()),
        }
    }

    fn is_unset(&self) -> bool {
        matches!(self, Ambiguity::Flag(false))
    }
}

/// (De)serializes a JSON object into an order-preserving list of pairs.
mod ordered_terms {
    use super::*;
    use serde::de::{MapAccess, Visitor};
    use serde::ser::SerializeMap;
    use serde::{Deserializer, Serializer};

    pub fn serialize<S>(terms: &[(String, Vec<String>)], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(terms.len()))?;
        for (key, list) in terms {
            map.serialize_entry(key, list)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<(String, Vec<String>)>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_map(OrderedTermsVisitor)
    }

    struct OrderedTermsVisitor;

    impl<'de> Visitor<'de> for OrderedTermsVisitor {
        type Value = Vec<(String, Vec<String>)>;

        fn expecting(&self, formatter: &mut fmt::Formatter) -> fmt::Result {
            formatter.write_str("a map of dictionary keys to term lists")
        }

        fn visit_map<A>(self, mut access: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut terms = Vec::with_capacity(access.size_hint().unwrap_or(2));
            while let Some((key, list)) = access.next_entry::<String, Vec<String>>()? {
                terms.push((key, list));
            }
            Ok(terms)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_keeps_key_order() {
        let json = r#"{
            "name": "Order",
            "terms": [
                { "category": "c", "terms": { "zeta": ["z"], "alpha": ["a"], "mid": ["m"] } }
            ]
        }"#;
        let definition = DictionaryDefinition::from_json_str(json).unwrap();
        let keys: Vec<&str> = definition.terms[0]
            .terms
            .iter()
            .map(|(k, _)| k.as_str())
            .collect();

        assert_eq!(keys, vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn test_ambiguity_variants_parse() {
        let json = r#"{
            "name": "Ambiguity",
            "terms": [
                { "category": "none", "terms": { "a": ["x"], "b": ["y"] } },
                { "category": "flag", "ambiguous": true, "terms": { "a": ["x"], "b": ["y"] } },
                { "category": "key", "ambiguous": "a", "terms": { "a": ["x"], "b": ["y"] } },
                { "category": "keys", "ambiguous": ["a", "b"], "terms": { "a": ["x"], "b": ["y"] } }
            ]
        }"#;
        let definition = DictionaryDefinition::from_json_str(json).unwrap();

        assert_eq!(definition.terms[0].ambiguous, Ambiguity::Flag(false));
        assert_eq!(definition.terms[1].ambiguous, Ambiguity::Flag(true));
        assert_eq!(definition.terms[2].ambiguous, Ambiguity::Key("a".to_string()));
        assert_eq!(
            definition.terms[3].ambiguous,
            Ambiguity::Keys(vec!["a".to_string(), "b".to_string()])
        );
    }

    #[test]
    fn test_ambiguity_applies_per_key() {
        assert!(!Ambiguity::Flag(false).applies_to("men"));
        assert!(Ambiguity::Flag(true).applies_to("men"));
        assert!(Ambiguity::Key("Men".to_string()).applies_to("men"));
        assert!(!Ambiguity::Key("men".to_string()).applies_to("women"));

        let keys = Ambiguity::Keys(vec!["men".to_string(), "boys".to_string()]);
        assert!(keys.applies_to("boys"));
        assert!(!keys.applies_to("women"));
    }

    #[test]
    fn test_missing_terms_list_defaults_to_empty() {
        let definition = DictionaryDefinition::from_json_str(r#"{ "name": "Empty" }"#).unwrap();
        assert_eq!(definition.name, "Empty");
        assert!(definition.terms.is_empty());
    }

    #[test]
    fn test_malformed_terms_is_error() {
        let json = r#"{ "name": "Bad", "terms": [ { "category": "c", "terms": ["a", "b"] } ] }"#;
        let result = DictionaryDefinition::from_json_str(json);
        assert!(matches!(result, Err(DictionaryError::Parse(_))));
    }

    #[test]
    fn test_serialize_keeps_order_and_skips_unset_ambiguity() {
        let definition = DictionaryDefinition::new(
            "Round",
            vec![DefinitionGroup::new("c", [("b", ["one"]), ("a", ["two"])])],
        );
        let json = serde_json::to_string(&definition).unwrap();

        assert_eq!(
            json,
            r#"{"name":"Round","terms":[{"category":"c","terms":{"b":["one"],"a":["two"]}}]}"#
        );
    }
}
