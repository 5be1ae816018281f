//! The top-level replacement session.
//!
//! A [`ReplacementSession`] owns its configuration and random source and
//! shares a read-only [`Dictionary`]. Processing a document parses it,
//! optionally strips scripts and injects a stylesheet and `<base>` element,
//! runs one or two rewrite passes and serializes the result.
//!
//! Sessions hold no shared mutable state: to process documents concurrently,
//! give each worker its own session via [`ReplacementSession::fork`].
//!
//! ```
//! use std::sync::Arc;
//! use dom_flip_lib::{Dictionary, ReplaceOptions, ReplacementSession, ReplacerConfig};
//!
//! let dictionary = Dictionary::from_json_str(
//!     r#"{ "name": "demo", "terms": [ { "category": "c", "terms": { "night": ["night"], "day": ["day"] } } ] }"#,
//! ).unwrap();
//! let mut session = ReplacementSession::new(Arc::new(dictionary), ReplacerConfig::default());
//!
//! let html = session.process("<p>Night falls</p>", "night", "day", &ReplaceOptions::default()).unwrap();
//! assert!(html.contains(r#"title="Night">Day</span>"#));
//! ```

use std::sync::Arc;

use html_escape::encode_double_quoted_attribute;
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::config::{ReplaceOptions, ReplacerConfig};
use crate::definition::DictionaryDefinition;
use crate::dictionary::Dictionary;
use crate::document::{Document, Fragment};
use crate::error::{DictionaryError, RewriteError};
use crate::rewriter::{DocumentRewriter, RewriteStats};

/// Replaces dictionary terms in HTML documents.
#[derive(Debug, Clone)]
pub struct ReplacementSession {
    dictionary: Arc<Dictionary>,
    config: ReplacerConfig,
    rng: StdRng,
}

impl ReplacementSession {
    /// Creates a session with an entropy-seeded random source.
    pub fn new(dictionary: Arc<Dictionary>, config: ReplacerConfig) -> Self {
        Self {
            dictionary,
            config,
            rng: StdRng::from_entropy(),
        }
    }

    /// Creates a session owning a dictionary built from `definition`.
    pub fn from_definition(
        definition: &DictionaryDefinition,
        config: ReplacerConfig,
    ) -> Result<Self, DictionaryError> {
        Ok(Self::new(Arc::new(Dictionary::from_definition(definition)?), config))
    }

    /// Reseeds the random source so ambiguous picks are reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    /// A new session sharing this one's dictionary and configuration, with
    /// its own entropy-seeded random source.
    pub fn fork(&self) -> Self {
        Self::new(Arc::clone(&self.dictionary), self.config.clone())
    }

    pub fn dictionary(&self) -> &Dictionary {
        &self.dictionary
    }

    pub fn config(&self) -> &ReplacerConfig {
        &self.config
    }

    /// Processes one HTML document and returns the rewritten markup.
    pub fn process(
        &mut self,
        html: &str,
        key_from: &str,
        key_to: &str,
        options: &ReplaceOptions,
    ) -> Result<String, RewriteError> {
        let mut document = Document::parse(html);

        self.sanitize(&mut document);
        self.inject_css(&mut document)?;
        if let Some(base_url) = &options.base_url {
            self.add_base_url(&mut document, base_url)?;
        }

        self.rewrite(&mut document, key_from, key_to)?;
        if options.replace_both_ways {
            self.rewrite(&mut document, key_to, key_from)?;
        }

        Ok(document.serialize())
    }

    /// Positional form of [`process`](Self::process).
    ///
    /// An empty `base_url` means no base URL.
    #[deprecated(note = "pass a `ReplaceOptions` to `process` instead")]
    pub fn process_positional(
        &mut self,
        html: &str,
        key_from: &str,
        key_to: &str,
        base_url: &str,
        replace_both_ways: bool,
    ) -> Result<String, RewriteError> {
        tracing::warn!(
            "Positional base URL / replace-both-ways arguments are deprecated; pass ReplaceOptions instead"
        );
        let options = ReplaceOptions::from_positional(base_url, replace_both_ways);
        self.process(html, key_from, key_to, &options)
    }

    /// Runs a single rewrite pass over an already parsed document.
    pub fn rewrite(
        &mut self,
        document: &mut Document,
        key_from: &str,
        key_to: &str,
    ) -> Result<RewriteStats, RewriteError> {
        DocumentRewriter::new(self.dictionary.store(), &self.config).rewrite(
            document,
            key_from,
            key_to,
            &mut self.rng,
        )
    }

    /// Removes every `<script>` element when script stripping is enabled.
    pub fn sanitize(&self, document: &mut Document) {
        if !self.config.strip_script_tags {
            return;
        }

        let scripts = document.elements_by_tag("script");
        if !scripts.is_empty() {
            tracing::debug!(count = scripts.len(), "Stripping script elements");
        }
        for script in scripts {
            document.remove(script);
        }
    }

    /// Inserts the configured stylesheet as the first child of `<head>`.
    ///
    /// The CSS is copied verbatim except for `</style` (any case), written as
    /// `<\/style` so it cannot close the element early.
    pub fn inject_css(&self, document: &mut Document) -> Result<(), RewriteError> {
        let Some(css) = self.config.css.as_deref().filter(|css| !css.is_empty()) else {
            return Ok(());
        };

        let head = document
            .first_element("head")
            .ok_or(RewriteError::MissingElement("head"))?;
        let fragment = Fragment::parse(&format!("<style>{}</style>", escape_style_end(css)))?;
        document.prepend(head, &fragment)
    }

    /// Ensures the document has exactly one `<base href>` pointing at `base_url`.
    ///
    /// The first existing `<base>` is replaced in place and any others are
    /// removed; without one, the new element becomes the first child of
    /// `<head>`. An empty URL leaves the document unchanged.
    pub fn add_base_url(&self, document: &mut Document, base_url: &str) -> Result<(), RewriteError> {
        if base_url.is_empty() {
            return Ok(());
        }

        let fragment = Fragment::parse(&format!(
            r#"<base href="{}" target="_blank">"#,
            encode_double_quoted_attribute(base_url)
        ))?;

        let mut existing = document.elements_by_tag("base").into_iter();
        match existing.next() {
            Some(first) => {
                document.replace(first, &fragment)?;
                for extra in existing {
                    document.remove(extra);
                }
            }
            None => {
                let head = document
                    .first_element("head")
                    .ok_or(RewriteError::MissingElement("head"))?;
                document.prepend(head, &fragment)?;
            }
        }
        Ok(())
    }
}

/// Escapes every case-insensitive `</style` in `css`, leaving the rest as is.
fn escape_style_end(css: &str) -> String {
    let lowered = css.to_ascii_lowercase();
    let mut escaped = String::with_capacity(css.len());
    let mut last = 0;

    for (start, _) in lowered.match_indices("</style") {
        escaped.push_str(&css[last..start]);
        escaped.push_str("<\\/");
        last = start + 2;
    }
    escaped.push_str(&css[last..]);
    escaped
}
