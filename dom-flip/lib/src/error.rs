//! Error types for the replacement engine.
//!
//! Lookup misses are deliberately absent: a term or key that is not in the
//! dictionary resolves to "no replacement" and the text is left alone.

use thiserror::Error;

/// Errors that can occur while loading a dictionary definition.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// Failed to read the definition file.
    #[error("failed to read dictionary: {0}")]
    Read(#[from] std::io::Error),

    /// The definition is not valid JSON or does not match the expected shape.
    #[error("failed to parse dictionary: {0}")]
    Parse(#[from] serde_json::Error),

    /// A definition group declares a key with an empty name.
    #[error("category '{category}' declares an empty dictionary key")]
    EmptyKey {
        /// The category of the offending group.
        category: String,
    },

    /// A definition group lists an empty or whitespace-only term.
    #[error("category '{category}' lists an empty term under key '{key}'")]
    EmptyTerm {
        /// The category of the offending group.
        category: String,
        /// The key the empty term is listed under.
        key: String,
    },
}

/// Errors that can occur while rewriting a document.
#[derive(Debug, Error)]
pub enum RewriteError {
    /// A generated markup fragment did not parse into the expected shape.
    #[error("failed to parse generated fragment: {0}")]
    FragmentParse(String),

    /// The combined term pattern could not be compiled.
    #[error("invalid term pattern: {0}")]
    InvalidPattern(#[from] regex::Error),

    /// The configured marker tag is not a plain element name.
    #[error("invalid marker tag name: '{0}'")]
    InvalidMarkerTag(String),

    /// A configured marker class is empty or contains whitespace.
    #[error("invalid marker class name: '{0}'")]
    InvalidClassName(String),

    /// The document lacks an element an injection needs.
    #[error("document has no <{0}> element")]
    MissingElement(&'static str),
}

/// Errors that can occur while loading a configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Failed to read the configuration file.
    #[error("failed to read config: {0}")]
    Read(#[from] std::io::Error),

    /// The configuration is not valid JSON.
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}
