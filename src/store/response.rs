//! Typed views over search and aggregation response payloads
//!
//! Aggregation shapes vary per view, so the response keeps them as raw JSON
//! and exposes typed extraction on demand; a shape mismatch surfaces as
//! [`StoreError::InvalidResponse`] instead of a panic.

use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::StoreError;

/// A search response: hit count plus named aggregation payloads
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResponse {
    /// Hit metadata (the views always search with size 0, so only the total
    /// matters)
    #[serde(default)]
    pub hits: Hits,

    /// Aggregation results keyed by the request's aggregation names
    #[serde(default)]
    pub aggregations: Map<String, Value>,
}

/// Hit metadata
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Hits {
    /// Total matching document count
    #[serde(default)]
    pub total: TotalHits,
}

/// Total hit count
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TotalHits {
    /// Number of documents matching the query
    pub value: u64,
}

impl SearchResponse {
    /// Total matching document count
    pub fn total_hits(&self) -> u64 {
        self.hits.total.value
    }

    /// Raw payload of a named aggregation
    pub fn aggregation(&self, name: &str) -> Result<&Value, StoreError> {
        self.aggregations.get(name).ok_or_else(|| {
            StoreError::InvalidResponse(format!("missing aggregation `{}`", name))
        })
    }

    /// Deserialize a named aggregation into its expected shape
    pub fn typed<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError> {
        serde_json::from_value(self.aggregation(name)?.clone()).map_err(|e| {
            StoreError::InvalidResponse(format!("aggregation `{}`: {}", name, e))
        })
    }
}

/// One page of a composite aggregation
#[derive(Debug, Clone, Deserialize)]
pub struct CompositeAggregation {
    /// Buckets in store response order
    pub buckets: Vec<CompositeBucket>,

    /// Continuation cursor echoing the last bucket's composite key; absent
    /// on the final page
    #[serde(default)]
    pub after_key: Option<Value>,
}

/// One composite aggregation bucket
#[derive(Debug, Clone, Deserialize)]
pub struct CompositeBucket {
    /// Composite key, one entry per grouping source
    pub key: Map<String, Value>,

    /// Documents in this bucket
    pub doc_count: u64,

    /// Nested sub-aggregation payloads
    #[serde(flatten)]
    pub aggregations: Map<String, Value>,
}

impl CompositeBucket {
    /// String component of the composite key
    pub fn key_str(&self, name: &str) -> Result<&str, StoreError> {
        self.key
            .get(name)
            .and_then(Value::as_str)
            .ok_or_else(|| StoreError::InvalidResponse(format!("bucket key `{}` is not a string", name)))
    }

    /// Integer component of the composite key
    pub fn key_i64(&self, name: &str) -> Result<i64, StoreError> {
        self.key
            .get(name)
            .and_then(Value::as_i64)
            .ok_or_else(|| StoreError::InvalidResponse(format!("bucket key `{}` is not an integer", name)))
    }

    /// Deserialize a nested sub-aggregation
    pub fn sub<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError> {
        let value = self.aggregations.get(name).ok_or_else(|| {
            StoreError::InvalidResponse(format!("missing sub-aggregation `{}`", name))
        })?;
        serde_json::from_value(value.clone()).map_err(|e| {
            StoreError::InvalidResponse(format!("sub-aggregation `{}`: {}", name, e))
        })
    }
}

/// A min/max metric aggregation value; `None` when the index holds no
/// matching documents
#[derive(Debug, Clone, Deserialize)]
pub struct MetricValue {
    /// Metric value in epoch milliseconds (for timestamp metrics)
    pub value: Option<f64>,
}

/// A `max_bucket` pipeline result: the winning value plus the keys of the
/// bucket(s) holding it
#[derive(Debug, Clone, Deserialize)]
pub struct MaxBucket {
    /// Maximum bucket value
    pub value: f64,

    /// Keys of the buckets holding the maximum (ties possible)
    #[serde(default)]
    pub keys: Vec<String>,
}

/// An `extended_stats_bucket` pipeline result over sibling bucket counts
#[derive(Debug, Clone, Deserialize)]
pub struct ExtendedStats {
    /// Sum of bucket counts
    pub sum: f64,

    /// Average bucket count
    pub avg: f64,

    /// Standard deviation of bucket counts
    pub std_deviation: f64,
}

/// An auto-sized date histogram
#[derive(Debug, Clone, Deserialize)]
pub struct DateHistogram {
    /// Time buckets in ascending order
    pub buckets: Vec<DateHistogramBucket>,
}

/// One date histogram bucket
#[derive(Debug, Clone, Deserialize)]
pub struct DateHistogramBucket {
    /// Bucket timestamp rendered by the store
    pub key_as_string: String,

    /// Documents in this bucket
    pub doc_count: u64,

    /// Nested sub-aggregation payloads
    #[serde(flatten)]
    pub aggregations: Map<String, Value>,
}

impl DateHistogramBucket {
    /// Deserialize a nested sub-aggregation
    pub fn sub<T: DeserializeOwned>(&self, name: &str) -> Result<T, StoreError> {
        let value = self.aggregations.get(name).ok_or_else(|| {
            StoreError::InvalidResponse(format!("missing sub-aggregation `{}`", name))
        })?;
        serde_json::from_value(value.clone()).map_err(|e| {
            StoreError::InvalidResponse(format!("sub-aggregation `{}`: {}", name, e))
        })
    }
}

/// The filtered per-code breakdown nested under histogram buckets
#[derive(Debug, Clone, Deserialize)]
pub struct FilteredCodeTerms {
    /// The inner terms aggregation keyed `code`
    pub code: TermsAggregation,
}

/// A plain terms aggregation
#[derive(Debug, Clone, Deserialize)]
pub struct TermsAggregation {
    /// Term buckets
    pub buckets: Vec<TermsBucket>,
}

/// One terms bucket
#[derive(Debug, Clone, Deserialize)]
pub struct TermsBucket {
    /// Term value (string or numeric depending on the field)
    pub key: Value,

    /// Documents holding the term
    pub doc_count: u64,
}
