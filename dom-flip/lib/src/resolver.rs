//! Resolution of matched words into replacement decisions.

use rand::Rng;

use crate::case::apply_matched_case;
use crate::store::{Replacement, Suggestions, TermStore};

/// What to do with one matched word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution<'a> {
    /// Replace with a single chosen term (or leave as is when `term` is `None`).
    Single(Replacement<'a>),
    /// Annotate with every candidate, keeping the visible text.
    Suggest(Suggestions<'a>),
}

impl Resolution<'_> {
    /// Whether the resolved term is flagged as ambiguous.
    pub fn is_ambiguous(&self) -> bool {
        match self {
            Resolution::Single(r) => r.ambiguous,
            Resolution::Suggest(s) => s.ambiguous,
        }
    }
}

/// Looks matched words up in a [`TermStore`].
#[derive(Debug, Clone, Copy)]
pub struct MatchResolver<'a> {
    store: &'a TermStore,
}

impl<'a> MatchResolver<'a> {
    pub fn new(store: &'a TermStore) -> Self {
        Self { store }
    }

    /// Resolves `matched` from `key_from` towards `key_to`.
    ///
    /// The lookup is case-insensitive. In suggestion mode the full candidate
    /// list is returned instead of a random pick.
    pub fn resolve<R: Rng + ?Sized>(
        &self,
        matched: &str,
        key_from: &str,
        key_to: &str,
        suggestion_mode: bool,
        rng: &mut R,
    ) -> Resolution<'a> {
        if suggestion_mode {
            Resolution::Suggest(self.store.pick_all(key_from, matched, key_to))
        } else {
            Resolution::Single(self.store.pick_one(key_from, matched, key_to, rng))
        }
    }

    /// Produces the text shown in place of `matched`.
    pub fn render_visible_term(matched: &str, chosen: &str, keep_same_case: bool) -> String {
        if keep_same_case {
            apply_matched_case(matched, chosen)
        } else {
            chosen.to_string()
        }
    }
}
