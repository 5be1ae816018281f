//! Session configuration and per-call options.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, RewriteError};

/// Configuration of a [`ReplacementSession`](crate::ReplacementSession).
///
/// Every field has a default, so a JSON config only needs the fields it
/// changes. Field names are camelCase in JSON:
///
/// ```
/// use dom_flip_lib::ReplacerConfig;
///
/// let config = ReplacerConfig::from_json_str(r#"{ "termClass": "flipped", "showDictionaryKeys": true }"#).unwrap();
/// assert_eq!(config.term_class, "flipped");
/// assert!(config.show_dictionary_keys);
/// assert!(config.show_original_term);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplacerConfig {
    /// Element name of the marker wrapped around each replacement.
    pub marker_tag: String,
    /// Put the original matched text into a `title` attribute.
    pub show_original_term: bool,
    /// Add `data-replaced-from` / `data-replaced-to` attributes.
    pub show_dictionary_keys: bool,
    /// Remove every `<script>` element before rewriting.
    pub strip_script_tags: bool,
    /// Reproduce the capitalization of the matched text.
    pub keep_same_case: bool,
    /// Annotate matches with their candidates instead of replacing them.
    pub suggestion_mode: bool,
    /// Class carried by every marker. An empty value in JSON falls back to
    /// `replaced-term`.
    #[serde(deserialize_with = "term_class_or_default")]
    pub term_class: String,
    /// Extra class carried by markers of ambiguous replacements. An empty
    /// value in JSON falls back to `ambiguous-term`.
    #[serde(deserialize_with = "ambiguous_class_or_default")]
    pub ambiguous_class: String,
    /// Stylesheet injected as the first child of `<head>`.
    pub css: Option<String>,
}

const DEFAULT_TERM_CLASS: &str = "replaced-term";
const DEFAULT_AMBIGUOUS_CLASS: &str = "ambiguous-term";

impl Default for ReplacerConfig {
    fn default() -> Self {
        Self {
            marker_tag: "span".to_string(),
            show_original_term: true,
            show_dictionary_keys: false,
            strip_script_tags: true,
            keep_same_case: true,
            suggestion_mode: false,
            term_class: DEFAULT_TERM_CLASS.to_string(),
            ambiguous_class: DEFAULT_AMBIGUOUS_CLASS.to_string(),
            css: None,
        }
    }
}

impl ReplacerConfig {
    /// Parses a configuration from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Reads and parses a configuration from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let json = std::fs::read_to_string(path)?;
        Self::from_json_str(&json)
    }

    /// Checks the marker tag and the marker classes.
    ///
    /// ## Returns
    ///
    /// - `Err(RewriteError::InvalidMarkerTag)` unless the tag is a plain
    ///   element name (ASCII letter, then letters, digits or `-`)
    /// - `Err(RewriteError::InvalidClassName)` if either class is empty or
    ///   contains whitespace; markers must stay recognizable by their class
    ///   or later passes would rewrite them again
    pub fn validate(&self) -> Result<(), RewriteError> {
        let mut chars = self.marker_tag.chars();
        let valid_tag = chars.next().is_some_and(|c| c.is_ascii_alphabetic())
            && chars.all(|c| c.is_ascii_alphanumeric() || c == '-');
        if !valid_tag {
            return Err(RewriteError::InvalidMarkerTag(self.marker_tag.clone()));
        }

        for class in [&self.term_class, &self.ambiguous_class] {
            if class.is_empty() || class.chars().any(char::is_whitespace) {
                return Err(RewriteError::InvalidClassName(class.clone()));
            }
        }

        Ok(())
    }
}

fn class_or_default<'de, D>(deserializer: D, default: &str) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let class = String::deserialize(deserializer)?;
    let class = class.trim();
    Ok(if class.is_empty() { default } else { class }.to_string())
}

fn term_class_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    class_or_default(deserializer, DEFAULT_TERM_CLASS)
}

fn ambiguous_class_or_default<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: serde::Deserializer<'de>,
{
    class_or_default(deserializer, DEFAULT_AMBIGUOUS_CLASS)
}

/// Options for a single [`process`](crate::ReplacementSession::process) call.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReplaceOptions {
    /// Base URL written into a `<base href>` element.
    pub base_url: Option<String>,
    /// Also replace in the reverse direction after the forward pass.
    pub replace_both_ways: bool,
}

impl ReplaceOptions {
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn both_ways(mut self) -> Self {
        self.replace_both_ways = true;
        self
    }

    /// Normalizes the positional calling convention; an empty URL means none.
    pub fn from_positional(base_url: &str, replace_both_ways: bool) -> Self {
        Self {
            base_url: (!base_url.is_empty()).then(|| base_url.to_string()),
            replace_both_ways,
        }
    }
}
