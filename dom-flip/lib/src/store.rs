//! The key → term → replacement-options mapping.
//!
//! [`TermStore`] is built once from a sequence of [`DefinitionGroup`]s and is
//! read-only afterwards. Keys and terms are stored lowercased; every lookup
//! lowercases its arguments, so queries are case-insensitive.
//!
//! Registration order is preserved for keys and for the terms under each key.
//! When the same `(key, term)` pair is loaded twice, the later entry replaces
//! the earlier one but keeps its original position.

use std::collections::HashMap;

use rand::Rng;

use crate::case::random_choice;
use crate::definition::DefinitionGroup;
use crate::error::DictionaryError;

/// Replacement data for one term under one key.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TermEntry {
    /// Whether replacements of this term are flagged as ambiguous.
    pub ambiguous: bool,
    /// Replacement options per other key, in declaration order.
    pub alternatives: Vec<(String, Vec<String>)>,
}

impl TermEntry {
    /// Returns the replacement options for `target_key`, if any.
    pub fn alternatives_for(&self, target_key: &str) -> Option<&[String]> {
        let target_key = target_key.to_lowercase();
        self.alternatives
            .iter()
            .find(|(key, _)| *key == target_key)
            .map(|(_, terms)| terms.as_slice())
    }
}

/// A single resolved replacement.
///
/// `term` is `None` when the dictionary has nothing for the requested
/// key/term/target combination; callers leave the text unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Replacement<'a> {
    pub term: Option<&'a str>,
    pub ambiguous: bool,
}

/// Every candidate replacement for a term.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Suggestions<'a> {
    pub terms: &'a [String],
    pub ambiguous: bool,
}

#[derive(Debug, Clone, Default)]
struct KeyTerms {
    order: Vec<String>,
    entries: HashMap<String, TermEntry>,
}

impl KeyTerms {
    fn insert(&mut self, term: String, entry: TermEntry) {
        if !self.entries.contains_key(&term) {
            self.order.push(term.clone());
        }
        self.entries.insert(term, entry);
    }
}

/// The dictionary's term index.
#[derive(Debug, Clone, Default)]
pub struct TermStore {
    keys: Vec<String>,
    terms: HashMap<String, KeyTerms>,
}

impl TermStore {
    /// Builds a store from definition groups, in order.
    ///
    /// For each key of each group, every term is registered with the group's
    /// full term map minus that key as its alternatives. Later groups win on
    /// `(key, term)` collisions.
    ///
    /// ## Arguments
    ///
    /// * `groups` - Definition groups in load order
    ///
    /// ## Returns
    ///
    /// The populated store, or [`DictionaryError::EmptyKey`] /
    /// [`DictionaryError::EmptyTerm`] when a group declares a blank key or term.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use dom_flip_lib::{DefinitionGroup, TermStore};
    ///
    /// let store = TermStore::load(&[
    ///     DefinitionGroup::new("Pronouns", [("men", vec!["He"]), ("women", vec!["she"])]),
    ///     DefinitionGroup::new("Nouns", [("men", vec!["man", "he"]), ("women", vec!["woman", "she"])]),
    /// ])
    /// .unwrap();
    ///
    /// assert_eq!(store.keys(), ["men", "women"]);
    /// assert_eq!(store.all_terms(Some("men")), vec!["he", "man"]);
    /// ```
    pub fn load(groups: &[DefinitionGroup]) -> Result<Self, DictionaryError> {
        let mut store = TermStore::default();

        for group in groups {
            let lowered: Vec<(String, Vec<String>)> = group
                .terms
                .iter()
                .map(|(key, list)| (key.to_lowercase(), list.iter().map(|t| t.to_lowercase()).collect()))
                .collect();

            for (key, list) in &lowered {
                if key.is_empty() {
                    return Err(DictionaryError::EmptyKey {
                        category: group.category.clone(),
                    });
                }
                // An empty term would match at every word boundary.
                if list.iter().any(|term| term.trim().is_empty()) {
                    return Err(DictionaryError::EmptyTerm {
                        category: group.category.clone(),
                        key: key.clone(),
                    });
                }
            }

            for (key, list) in &lowered {
                let ambiguous = group.ambiguous.applies_to(key);
                let alternatives: Vec<(String, Vec<String>)> = lowered
                    .iter()
                    .filter(|(other, _)| other != key)
                    .cloned()
                    .collect();

                let key_terms = store.key_terms_mut(key);
                for term in list {
                    key_terms.insert(
                        term.clone(),
                        TermEntry {
                            ambiguous,
                            alternatives: alternatives.clone(),
                        },
                    );
                }
            }
        }

        tracing::debug!(
            keys = store.keys.len(),
            terms = store.len(),
            "Term store loaded"
        );

        Ok(store)
    }

    fn key_terms_mut(&mut self, key: &str) -> &mut KeyTerms {
        if !self.terms.contains_key(key) {
            self.keys.push(key.to_string());
        }
        self.terms.entry(key.to_string()).or_default()
    }

    /// Registered keys, in registration order.
    pub fn keys(&self) -> &[String] {
        &self.keys
    }

    /// Total number of `(key, term)` entries.
    pub fn len(&self) -> usize {
        self.terms.values().map(|k| k.order.len()).sum()
    }

    /// Returns `true` if no term is registered.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All terms registered under `key`, or under every key when `None`.
    ///
    /// Unknown keys yield an empty list.
    pub fn all_terms(&self, key: Option<&str>) -> Vec<&str> {
        match key {
            Some(key) => self
                .terms
                .get(&key.to_lowercase())
                .map(|k| k.order.iter().map(String::as_str).collect())
                .unwrap_or_default(),
            None => self
                .keys
                .iter()
                .filter_map(|key| self.terms.get(key))
                .flat_map(|k| k.order.iter().map(String::as_str))
                .collect(),
        }
    }

    /// Looks up the entry for `term` under `key`.
    pub fn options(&self, key: &str, term: &str) -> Option<&TermEntry> {
        self.terms
            .get(&key.to_lowercase())?
            .entries
            .get(&term.to_lowercase())
    }

    /// Picks one replacement for `term` towards `target_key`, uniformly at random.
    ///
    /// ## Arguments
    ///
    /// * `key` - The key `term` is registered under
    /// * `term` - The matched term, in any case
    /// * `target_key` - The key to draw the replacement from
    /// * `rng` - Random source for the choice among several options
    ///
    /// ## Returns
    ///
    /// A [`Replacement`] whose `term` is `None` when any of the three lookups
    /// misses. Misses are not errors.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use dom_flip_lib::{DefinitionGroup, TermStore};
    /// use rand::SeedableRng;
    /// use rand::rngs::StdRng;
    ///
    /// let store = TermStore::load(&[DefinitionGroup::new(
    ///     "Time",
    ///     [("night", vec!["dusk"]), ("day", vec!["dawn", "sunrise"])],
    /// )])
    /// .unwrap();
    /// let mut rng = StdRng::seed_from_u64(3);
    ///
    /// let picked = store.pick_one("night", "Dusk", "day", &mut rng);
    /// assert!(matches!(picked.term, Some("dawn") | Some("sunrise")));
    /// assert_eq!(store.pick_one("night", "dusk", "noon", &mut rng).term, None);
    /// ```
    pub fn pick_one<R: Rng + ?Sized>(
        &self,
        key: &str,
        term: &str,
        target_key: &str,
        rng: &mut R,
    ) -> Replacement<'_> {
        let Some(entry) = self.options(key, term) else {
            return Replacement::default();
        };

        Replacement {
            ambiguous: entry.ambiguous,
            term: entry
                .alternatives_for(target_key)
                .and_then(|terms| random_choice(terms, rng))
                .map(String::as_str),
        }
    }

    /// Returns every replacement for `term` towards `target_key`.
    ///
    /// Used by suggestion mode. The list is empty on any lookup miss and keeps
    /// declaration order otherwise.
    pub fn pick_all(&self, key: &str, term: &str, target_key: &str) -> Suggestions<'_> {
        let Some(entry) = self.options(key, term) else {
            return Suggestions::default();
        };

        Suggestions {
            ambiguous: entry.ambiguous,
            terms: entry.alternatives_for(target_key).unwrap_or_default(),
        }
    }
}
