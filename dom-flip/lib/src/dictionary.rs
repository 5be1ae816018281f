//! A named dictionary backed by a [`TermStore`].

use std::path::Path;

use crate::definition::DictionaryDefinition;
use crate::error::DictionaryError;
use crate::store::TermStore;

/// A loaded, immutable replacement dictionary.
///
/// Cheap to share behind an `Arc`: it is never mutated after construction.
#[derive(Debug, Clone)]
pub struct Dictionary {
    name: String,
    store: TermStore,
}

impl Dictionary {
    /// Builds the dictionary from a parsed definition.
    pub fn from_definition(definition: &DictionaryDefinition) -> Result<Self, DictionaryError> {
        Ok(Self {
            name: definition.name.clone(),
            store: TermStore::load(&definition.terms)?,
        })
    }

    /// Parses and builds the dictionary from JSON text.
    pub fn from_json_str(json: &str) -> Result<Self, DictionaryError> {
        Self::from_definition(&DictionaryDefinition::from_json_str(json)?)
    }

    /// Reads and builds the dictionary from a JSON file.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, DictionaryError> {
        let path = path.as_ref();
        let dictionary = Self::from_definition(&DictionaryDefinition::from_path(path)?)?;
        tracing::info!(
            path = %path.display(),
            name = %dictionary.name,
            terms = dictionary.store.len(),
            "Loaded dictionary"
        );
        Ok(dictionary)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn store(&self) -> &TermStore {
        &self.store
    }
}
