//! Backend search parameters.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Default number of documents returned by a search.
pub const DEFAULT_K: usize = 4;

/// Backend-specific search parameters.
///
/// The mapping is opaque to the factory layer and passed through to the
/// backend. The accessors below cover the keys the bundled backends read.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SearchKwargs(Map<String, Value>);

impl SearchKwargs {
    /// Creates empty search parameters.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets a raw parameter.
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Sets the number of documents to return.
    pub fn with_k(self, k: usize) -> Self {
        self.with("k", Value::from(k))
    }

    /// Sets the metadata filter.
    pub fn with_filter(self, filter: Map<String, Value>) -> Self {
        self.with("filter", Value::Object(filter))
    }

    /// Returns a raw parameter.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Number of documents to return (`k`, default 4).
    pub fn k(&self) -> usize {
        self.usize_param("k").unwrap_or(DEFAULT_K)
    }

    /// Size of the approximate candidate pool (`fetch_k` or `num_candidates`).
    pub fn fetch_k(&self) -> Option<usize> {
        self.usize_param("fetch_k")
            .or_else(|| self.usize_param("num_candidates"))
    }

    /// Metadata filter, when it is a JSON object.
    pub fn filter(&self) -> Option<&Map<String, Value>> {
        self.0.get("filter").and_then(Value::as_object)
    }

    /// Partition namespace (Pinecone).
    pub fn namespace(&self) -> Option<&str> {
        self.0.get("namespace").and_then(Value::as_str)
    }

    /// Minimum score a result must reach to be returned.
    pub fn score_threshold(&self) -> Option<f32> {
        self.0
            .get("score_threshold")
            .and_then(Value::as_f64)
            .map(|v| v as f32)
    }

    /// Returns the underlying mapping.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    fn usize_param(&self, key: &str) -> Option<usize> {
        self.0
            .get(key)
            .and_then(Value::as_u64)
            .and_then(|v| usize::try_from(v).ok())
    }
}

impl From<Map<String, Value>> for SearchKwargs {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}
