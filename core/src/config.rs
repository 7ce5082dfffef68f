use crate::error::{Error, Result};
use crate::fuzzy::DEFAULT_THRESHOLD;
use crate::schema::Schema;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// What happens to a document that fails schema validation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strictness {
    /// Log a warning, skip the document and keep going.
    #[default]
    Lenient,
    /// Stop at the first invalid document and return the error.
    Strict,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheSizes {
    pub query: usize,
    pub distance: usize,
    pub normalize: usize,
    pub stem: usize,
}

impl Default for CacheSizes {
    fn default() -> Self {
        Self { query: 256, distance: 65_536, normalize: 4_096, stem: 16_384 }
    }
}

/// Engine tuning knobs. Every field has a default, so a partial JSON/TOML
/// object deserializes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineOptions {
    /// Edit distances below this count as a match; length differences at or
    /// above it never do.
    pub fuzzy_threshold: usize,
    /// Chunk size for batch insert/remove.
    pub batch_size: usize,
    pub strictness: Strictness,
    /// Clear the query cache whenever the document set changes.
    pub invalidate_on_write: bool,
    pub cache: CacheSizes,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            fuzzy_threshold: DEFAULT_THRESHOLD,
            batch_size: 100,
            strictness: Strictness::default(),
            invalidate_on_write: true,
            cache: CacheSizes::default(),
        }
    }
}

impl EngineOptions {
    pub fn strict(mut self) -> Self {
        self.strictness = Strictness::Strict;
        self
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size;
        self
    }

    pub fn with_fuzzy_threshold(mut self, threshold: usize) -> Self {
        self.fuzzy_threshold = threshold;
        self
    }

    pub fn keep_stale_results(mut self) -> Self {
        self.invalidate_on_write = false;
        self
    }

    /// Zero sizes and thresholds are raised to one.
    pub(crate) fn normalized(mut self) -> Self {
        self.fuzzy_threshold = self.fuzzy_threshold.max(1);
        self.batch_size = self.batch_size.max(1);
        self
    }
}

/// Read the engine's constructor value: an object holding exactly one key, `schema`.
pub fn schema_from_config(config: &Value) -> Result<Schema> {
    let map = config
        .as_object()
        .ok_or_else(|| Error::config("engine configuration must be an object with a 'schema' key"))?;
    if let Some(extra) = map.keys().find(|k| k.as_str() != "schema") {
        return Err(Error::config(format!("unexpected configuration key '{extra}'; expected only 'schema'")));
    }
    let schema = map.get("schema").ok_or_else(|| Error::config("engine configuration is missing 'schema'"))?;
    Schema::from_json(schema)
}
