//! The document-wide replacement pass.
//!
//! One pass of [`DocumentRewriter::rewrite`] works as follows:
//!
//! 1. Compile every term registered under the source key into one
//!    case-insensitive alternation, each term escaped and wrapped in `\b`.
//! 2. Snapshot the prose text nodes under `<body>`. The snapshot is the
//!    traversal contract: every text node that existed before the pass is
//!    visited exactly once, in document order, and nodes inserted by the pass
//!    are never visited.
//! 3. For each text node not already inside a marker, replace every match
//!    with marker markup, parse the result as a fragment, splice its nodes in
//!    before the text node and detach the text node.
//!
//! A text node without matches is never touched.

use html_escape::encode_text;
use rand::Rng;
use regex::{Regex, RegexBuilder};

use crate::case::escape_for_pattern;
use crate::config::ReplacerConfig;
use crate::document::{Document, Fragment};
use crate::error::RewriteError;
use crate::marker::MarkerBuilder;
use crate::resolver::{MatchResolver, Resolution};
use crate::store::{Replacement, TermStore};

/// Compiled size limit for the combined alternation.
const PATTERN_SIZE_LIMIT: usize = 64 * (1 << 20);

/// A case-insensitive alternation of whole-word terms.
///
/// Built from an empty term list it matches nothing.
#[derive(Debug, Clone)]
pub struct TermPattern {
    regex: Option<Regex>,
}

impl TermPattern {
    /// Compiles `terms` into one case-insensitive whole-word alternation.
    ///
    /// ## Arguments
    ///
    /// * `terms` - Terms to match, tried left to right at each position
    ///
    /// ## Returns
    ///
    /// The pattern, or [`RewriteError::InvalidPattern`] if the alternation
    /// exceeds the compiled size limit.
    ///
    /// ## Examples
    ///
    /// ```rust
    /// use dom_flip_lib::TermPattern;
    ///
    /// let pattern = TermPattern::build(&["man", "a.b"]).unwrap();
    /// assert_eq!(pattern.as_str(), r"\bman\b|\ba\.b\b");
    /// assert!(pattern.is_match("The MAN"));
    /// assert!(!pattern.is_match("manly"));
    /// ```
    pub fn build(terms: &[&str]) -> Result<Self, RewriteError> {
        if terms.is_empty() {
            return Ok(Self { regex: None });
        }

        let alternation = terms
            .iter()
            .map(|term| format!(r"\b{}\b", escape_for_pattern(term)))
            .collect::<Vec<_>>()
            .join("|");

        let regex = RegexBuilder::new(&alternation)
            .case_insensitive(true)
            .size_limit(PATTERN_SIZE_LIMIT)
            .build()?;

        Ok(Self { regex: Some(regex) })
    }

    /// The pattern source; empty when the pattern matches nothing.
    pub fn as_str(&self) -> &str {
        self.regex.as_ref().map(Regex::as_str).unwrap_or_default()
    }

    pub fn matches_nothing(&self) -> bool {
        self.regex.is_none()
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.regex.as_ref().is_some_and(|r| r.is_match(text))
    }

    /// Non-overlapping matches, left to right.
    pub fn find_iter<'t>(&self, text: &'t str) -> impl Iterator<Item = regex::Match<'t>> {
        self.regex.iter().flat_map(move |r| r.find_iter(text))
    }
}

/// Counters for one pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RewriteStats {
    /// Text nodes examined.
    pub visited: usize,
    /// Text nodes replaced by marker-bearing fragments.
    pub rewritten: usize,
    /// Markers inserted.
    pub replacements: usize,
}

/// Runs replacement passes over documents.
#[derive(Debug, Clone, Copy)]
pub struct DocumentRewriter<'a> {
    store: &'a TermStore,
    config: &'a ReplacerConfig,
}

impl<'a> DocumentRewriter<'a> {
    pub fn new(store: &'a TermStore, config: &'a ReplacerConfig) -> Self {
        Self { store, config }
    }

    /// Replaces every `key_from` term in the document body with a marker.
    ///
    /// ## Arguments
    ///
    /// * `document` - The document to rewrite in place
    /// * `key_from` - Key whose terms are searched for
    /// * `key_to` - Key whose terms replace the matches
    /// * `rng` - Random source for terms with several replacements
    ///
    /// ## Returns
    ///
    /// Counters for the pass. Fails if the configuration is invalid or a
    /// generated fragment does not parse.
    ///
    /// ## Notes
    ///
    /// - Unknown keys and terms without a counterpart are left unchanged
    /// - Text already inside a marker (by term class) is never rewritten
    #[tracing::instrument(level = "debug", skip_all, fields(key_from = %key_from, key_to = %key_to))]
    pub fn rewrite<R: Rng + ?Sized>(
        &self,
        document: &mut Document,
        key_from: &str,
        key_to: &str,
        rng: &mut R,
    ) -> Result<RewriteStats, RewriteError> {
        self.config.validate()?;

        let terms = self.store.all_terms(Some(key_from));
        let pattern = TermPattern::build(&terms)?;
        let mut stats = RewriteStats::default();

        if pattern.matches_nothing() {
            tracing::debug!("No terms registered for source key");
            return Ok(stats);
        }

        let Some(body) = document.first_element("body") else {
            tracing::debug!("Document has no body");
            return Ok(stats);
        };

        let resolver = MatchResolver::new(self.store);
        let markers = MarkerBuilder::new(self.config, key_from, key_to);

        for node in document.text_nodes(body) {
            stats.visited += 1;

            if self.is_marked(document, node) {
                continue;
            }

            let Some(text) = document.text(node) else {
                continue;
            };
            if !pattern.is_match(text) {
                continue;
            }

            let Some((markup, count)) =
                self.rewrite_text(text, &pattern, &resolver, &markers, key_from, key_to, rng)
            else {
                continue;
            };

            let fragment = Fragment::parse(&markup)?;
            document.replace(node, &fragment)?;

            tracing::trace!(count, nodes = fragment.len(), "Rewrote text node");
            stats.rewritten += 1;
            stats.replacements += count;
        }

        tracing::debug!(
            terms = terms.len(),
            visited = stats.visited,
            rewritten = stats.rewritten,
            replacements = stats.replacements,
            "Rewrite pass complete"
        );

        Ok(stats)
    }

    /// A node is skipped when it, or its parent, is a marker.
    fn is_marked(&self, document: &Document, node: ego_tree::NodeId) -> bool {
        let class = &self.config.term_class;
        document.carries_class(node, class)
            || document
                .parent(node)
                .is_some_and(|parent| document.carries_class(parent, class))
    }

    /// Builds escaped markup for `text` with every resolvable match wrapped.
    ///
    /// Returns `None` when nothing was wrapped.
    #[allow(clippy::too_many_arguments)]
    fn rewrite_text<R: Rng + ?Sized>(
        &self,
        text: &str,
        pattern: &TermPattern,
        resolver: &MatchResolver<'_>,
        markers: &MarkerBuilder<'_>,
        key_from: &str,
        key_to: &str,
        rng: &mut R,
    ) -> Option<(String, usize)> {
        let mut markup = String::with_capacity(text.len() * 2);
        let mut last = 0;
        let mut count = 0;

        for found in pattern.find_iter(text) {
            let matched = found.as_str();

            let marker = match resolver.resolve(matched, key_from, key_to, self.config.suggestion_mode, rng) {
                Resolution::Single(Replacement {
                    term: Some(term),
                    ambiguous,
                }) => {
                    let visible =
                        MatchResolver::render_visible_term(matched, term, self.config.keep_same_case);
                    markers.replacement(matched, &visible, ambiguous)
                }
                Resolution::Single(Replacement { term: None, .. }) => {
                    tracing::trace!(matched, "No replacement for term, leaving it unchanged");
                    continue;
                }
                Resolution::Suggest(suggestions) => {
                    markers.suggestion(matched, suggestions.terms, suggestions.ambiguous)
                }
            };

            markup.push_str(&encode_text(&text[last..found.start()]));
            markup.push_str(&marker);
            last = found.end();
            count += 1;
        }

        if count == 0 {
            return None;
        }

        markup.push_str(&encode_text(&text[last..]));
        Some((markup, count))
    }
}
