//! Dictionary-driven term replacement inside HTML documents.
//!
//! Words and phrases registered under one dictionary key are swapped for
//! their counterparts under another key (for example gendered terms), and
//! every replacement is wrapped in a styled marker element. Only prose text
//! nodes are rewritten: attributes, comments, scripts and previously marked
//! regions are left intact.
//!
//! ## Core Types
//!
//! - [`DictionaryDefinition`] / [`DefinitionGroup`] - The JSON dictionary format
//! - [`TermStore`] - Case-insensitive key → term → alternatives index
//! - [`Dictionary`] - A named, immutable dictionary
//! - [`ReplacerConfig`] / [`ReplaceOptions`] - Session configuration and per-call options
//!
//! ## Replacement
//!
//! - [`MatchResolver`] - Turns a matched word into a replacement decision
//! - [`DocumentRewriter`] - One document-wide replacement pass
//! - [`ReplacementSession`] - Parse, sanitize, inject, rewrite and serialize
//!
//! ## Helpers
//!
//! - [`case`] - Pattern escaping, random choice and capitalization

pub mod case;
mod config;
mod definition;
mod dictionary;
pub mod document;
mod error;
pub mod marker;
mod resolver;
mod rewriter;
mod session;
mod store;

pub use config::{ReplaceOptions, ReplacerConfig};
pub use definition::{Ambiguity, DefinitionGroup, DictionaryDefinition};
pub use dictionary::Dictionary;
pub use document::{Document, Fragment};
pub use error::{ConfigError, DictionaryError, RewriteError};
pub use resolver::{MatchResolver, Resolution};
pub use rewriter::{DocumentRewriter, RewriteStats, TermPattern};
pub use session::ReplacementSession;
pub use store::{Replacement, Suggestions, TermEntry, TermStore};
