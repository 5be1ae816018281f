//! Markup for the marker element wrapped around each replacement.
//!
//! ```text
//! <TAG class="TERM[ AMBIGUOUS]" [title="ORIGINAL"] [data-replaced-from="KEY"]
//!      [data-replaced-to="KEY"] [data-replacement-options="['a','b']">VISIBLE</TAG>
//! ```
//!
//! Attribute values and visible text are HTML-escaped here, so the markup can
//! be parsed back without text turning into elements.

use html_escape::{encode_double_quoted_attribute, encode_text};

use crate::config::ReplacerConfig;

/// Renders marker elements for one rewrite direction.
#[derive(Debug, Clone, Copy)]
pub struct MarkerBuilder<'a> {
    config: &'a ReplacerConfig,
    key_from: &'a str,
    key_to: &'a str,
}

impl<'a> MarkerBuilder<'a> {
    pub fn new(config: &'a ReplacerConfig, key_from: &'a str, key_to: &'a str) -> Self {
        Self {
            config,
            key_from,
            key_to,
        }
    }

    /// Marker showing `visible` in place of `matched`.
    pub fn replacement(&self, matched: &str, visible: &str, ambiguous: bool) -> String {
        let title = self.config.show_original_term.then_some(matched);
        self.render(ambiguous, title, None, visible)
    }

    /// Marker keeping `matched` visible and listing `candidates`.
    pub fn suggestion(&self, matched: &str, candidates: &[String], ambiguous: bool) -> String {
        self.render(ambiguous, None, Some(candidates), matched)
    }

    fn render(
        &self,
        ambiguous: bool,
        title: Option<&str>,
        candidates: Option<&[String]>,
        visible: &str,
    ) -> String {
        let tag = &self.config.marker_tag;
        let mut markup = format!("<{tag} class=\"{}", encode_double_quoted_attribute(&self.config.term_class));

        if ambiguous {
            markup.push(' ');
            markup.push_str(&encode_double_quoted_attribute(&self.config.ambiguous_class));
        }
        markup.push('"');

        if let Some(title) = title {
            push_attribute(&mut markup, "title", title);
        }
        if self.config.show_dictionary_keys {
            push_attribute(&mut markup, "data-replaced-from", self.key_from);
            push_attribute(&mut markup, "data-replaced-to", self.key_to);
        }
        if let Some(candidates) = candidates {
            push_attribute(&mut markup, "data-replacement-options", &format_options(candidates));
        }

        markup.push_str(&format!(">{}</{tag}>", encode_text(visible)));
        markup
    }
}

fn push_attribute(markup: &mut String, name: &str, value: &str) {
    markup.push_str(&format!(" {name}=\"{}\"", encode_double_quoted_attribute(value)));
}

/// Formats candidates as a single-quoted list, e.g. `['her','hers']`.
pub fn format_options(candidates: &[String]) -> String {
    let items: Vec<String> = candidates
        .iter()
        .map(|c| format!("'{}'", c.replace('\\', "\\\\").replace('\'', "\\'")))
        .collect();
    format!("[{}]", items.join(","))
}
