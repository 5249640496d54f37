use indexmap::IndexMap;
use scribe_config::TranscriptionConfig;

use crate::{error::RelayError, types::ModelInfo};

/// Description shown for models configured without one
pub const UNKNOWN_MODEL_DESCRIPTION: &str = "Unknown model";

/// Read-only table of selectable models, fixed at startup
#[derive(Debug, Clone)]
pub struct ModelCatalog {
    ids: IndexMap<String, String>,
    descriptions: IndexMap<String, String>,
    default_key: String,
}

impl ModelCatalog {
    /// Build the catalog from configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the table is empty or the default key is not in it
    pub fn from_config(config: &TranscriptionConfig) -> crate::error::Result<Self> {
        let ids = config
            .models
            .iter()
            .map(|(key, model)| (key.clone(), model.id.clone()))
            .collect();

        let descriptions = config
            .models
            .iter()
            .filter_map(|(key, model)| Some((key.clone(), model.description.clone()?)))
            .collect();

        Self::new(ids, descriptions, &config.default_model)
    }

    /// Build a catalog from key → id and key → description tables
    ///
    /// # Errors
    ///
    /// Returns an error if `ids` is empty or does not contain `default_key`
    pub fn new(
        ids: IndexMap<String, String>,
        descriptions: IndexMap<String, String>,
        default_key: &str,
    ) -> crate::error::Result<Self> {
        if !ids.contains_key(default_key) {
            return Err(RelayError::Configuration(format!(
                "default model '{default_key}' is not among the configured models"
            )));
        }

        Ok(Self {
            ids,
            descriptions,
            default_key: default_key.to_string(),
        })
    }

    /// Canonical id for `key`, or the default model's id when the key is absent or unknown
    pub fn resolve(&self, key: Option<&str>) -> &str {
        key.and_then(|key| self.ids.get(key))
            .or_else(|| self.ids.get(&self.default_key))
            .map_or("", String::as_str)
    }

    /// Key used when callers do not name a known model
    pub fn default_key(&self) -> &str {
        &self.default_key
    }

    /// Every model in configuration order
    pub fn list(&self) -> Vec<ModelInfo> {
        self.ids
            .iter()
            .map(|(key, id)| ModelInfo {
                key: key.clone(),
                name: id.clone(),
                description: self
                    .descriptions
                    .get(key)
                    .cloned()
                    .unwrap_or_else(|| UNKNOWN_MODEL_DESCRIPTION.to_string()),
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}
