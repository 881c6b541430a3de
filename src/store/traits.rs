//! The document store protocol seam

use async_trait::async_trait;
use serde_json::Value;

use crate::error::StoreError;

use super::response::SearchResponse;

/// Request/response protocol against the backing search engine
///
/// Implementations must guarantee exact-match filtering on categorical
/// fields and numeric range filtering on the timestamp field. All calls are
/// network-bound and carry no internal retry beyond what the implementation
/// applies at the transport layer; store-level faults propagate to the
/// caller as [`StoreError`].
#[async_trait]
pub trait DocumentStore: Send + Sync + 'static {
    /// Check whether an index exists
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError>;

    /// Create an index with the given field mappings
    ///
    /// Concurrent first callers may race the existence check, so "already
    /// exists" answers must be treated as success.
    async fn create_index(&self, index: &str, mappings: &Value) -> Result<(), StoreError>;

    /// Register (or replace) an ingest pipeline
    async fn put_pipeline(&self, id: &str, body: &Value) -> Result<(), StoreError>;

    /// Execute a search request body (query + aggregations) against an index
    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, StoreError>;

    /// Bulk-index documents through an ingest pipeline
    ///
    /// Returns the store-reported success count. Partial failures are not
    /// specially handled; the reported count is returned as-is.
    async fn bulk(
        &self,
        index: &str,
        pipeline: &str,
        documents: &[Value],
    ) -> Result<u64, StoreError>;

    /// Delete every document matching a query, refreshing the index so the
    /// deletion is immediately visible. Returns the deleted count.
    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<u64, StoreError>;

    /// Force just-indexed documents to become visible to subsequent reads
    async fn refresh(&self, index: &str) -> Result<(), StoreError>;
}
