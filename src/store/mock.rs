//! Scripted in-memory document store
//!
//! Intended for unit and integration testing without a running search
//! engine. Search responses are served by a scripted handler (FIFO queue or
//! caller-provided routing closure); every protocol call is recorded so
//! tests can assert on request shapes and call ordering.
//!
//! **Not suitable for production use**: nothing is stored, and search
//! answers are whatever the script says they are.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};

use crate::error::StoreError;

use super::response::SearchResponse;
use super::traits::DocumentStore;

/// A recorded protocol call
#[derive(Debug, Clone, PartialEq)]
pub enum StoreCall {
    /// `index_exists` was invoked
    IndexExists {
        /// Target index
        index: String,
    },
    /// `create_index` was invoked
    CreateIndex {
        /// Target index
        index: String,
    },
    /// `put_pipeline` was invoked
    PutPipeline {
        /// Pipeline id
        id: String,
    },
    /// `search` was invoked
    Search {
        /// Target index
        index: String,
        /// Full request body
        body: Value,
    },
    /// `bulk` was invoked
    Bulk {
        /// Target index
        index: String,
        /// Ingest pipeline id
        pipeline: String,
        /// Number of documents submitted
        documents: usize,
    },
    /// `delete_by_query` was invoked
    DeleteByQuery {
        /// Target index
        index: String,
        /// Delete predicate
        query: Value,
    },
    /// `refresh` was invoked
    Refresh {
        /// Target index
        index: String,
    },
}

type SearchHandler = Box<dyn FnMut(&str, &Value) -> Result<SearchResponse, StoreError> + Send>;

/// Scripted [`DocumentStore`] for tests
pub struct MockStore {
    search_handler: Mutex<SearchHandler>,
    calls: Mutex<Vec<StoreCall>>,
    index_exists: AtomicBool,
    deleted_count: AtomicU64,
}

impl MockStore {
    /// A store whose searches all answer with zero hits and no aggregations
    pub fn new() -> Self {
        Self::with_search_handler(|_, _| {
            serde_json::from_value(empty_search_response())
                .map_err(|e| StoreError::InvalidResponse(e.to_string()))
        })
    }

    /// A store answering searches from a FIFO queue of response bodies
    ///
    /// Exhausting the queue yields [`StoreError::InvalidResponse`].
    pub fn with_responses(responses: Vec<Value>) -> Self {
        let mut queue: VecDeque<Value> = responses.into();
        Self::with_search_handler(move |_, _| {
            let next = queue.pop_front().ok_or_else(|| {
                StoreError::InvalidResponse("mock response queue exhausted".to_string())
            })?;
            serde_json::from_value(next).map_err(|e| StoreError::InvalidResponse(e.to_string()))
        })
    }

    /// A store routing each search through a caller-provided closure
    ///
    /// Needed when concurrent queries must receive different answers based
    /// on the request body rather than call order.
    pub fn with_search_handler(
        handler: impl FnMut(&str, &Value) -> Result<SearchResponse, StoreError> + Send + 'static,
    ) -> Self {
        Self {
            search_handler: Mutex::new(Box::new(handler)),
            calls: Mutex::new(Vec::new()),
            index_exists: AtomicBool::new(false),
            deleted_count: AtomicU64::new(0),
        }
    }

    /// Script whether the index exists before any `create_index` call
    pub fn set_index_exists(&self, exists: bool) {
        self.index_exists.store(exists, Ordering::SeqCst);
    }

    /// Script the count reported by `delete_by_query`
    pub fn set_deleted_count(&self, count: u64) {
        self.deleted_count.store(count, Ordering::SeqCst);
    }

    /// Every protocol call in invocation order
    pub fn calls(&self) -> Vec<StoreCall> {
        self.calls.lock().clone()
    }

    /// The bodies of every search request, in order
    pub fn search_bodies(&self) -> Vec<Value> {
        self.calls
            .lock()
            .iter()
            .filter_map(|call| match call {
                StoreCall::Search { body, .. } => Some(body.clone()),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: StoreCall) {
        self.calls.lock().push(call);
    }
}

impl Default for MockStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DocumentStore for MockStore {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        self.record(StoreCall::IndexExists {
            index: index.to_string(),
        });
        Ok(self.index_exists.load(Ordering::SeqCst))
    }

    async fn create_index(&self, index: &str, _mappings: &Value) -> Result<(), StoreError> {
        self.record(StoreCall::CreateIndex {
            index: index.to_string(),
        });
        // "already exists" is non-fatal, mirroring the real store
        self.index_exists.store(true, Ordering::SeqCst);
        Ok(())
    }

    async fn put_pipeline(&self, id: &str, _body: &Value) -> Result<(), StoreError> {
        self.record(StoreCall::PutPipeline { id: id.to_string() });
        Ok(())
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, StoreError> {
        self.record(StoreCall::Search {
            index: index.to_string(),
            body: body.clone(),
        });
        let mut handler = self.search_handler.lock();
        (*handler)(index, body)
    }

    async fn bulk(
        &self,
        index: &str,
        pipeline: &str,
        documents: &[Value],
    ) -> Result<u64, StoreError> {
        self.record(StoreCall::Bulk {
            index: index.to_string(),
            pipeline: pipeline.to_string(),
            documents: documents.len(),
        });
        Ok(documents.len() as u64)
    }

    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<u64, StoreError> {
        self.record(StoreCall::DeleteByQuery {
            index: index.to_string(),
            query: query.clone(),
        });
        Ok(self.deleted_count.load(Ordering::SeqCst))
    }

    async fn refresh(&self, index: &str) -> Result<(), StoreError> {
        self.record(StoreCall::Refresh {
            index: index.to_string(),
        });
        Ok(())
    }
}

/// A search response body with the given hit total and aggregations
pub fn search_response(total_hits: u64, aggregations: Value) -> Value {
    json!({
        "hits": { "total": { "value": total_hits } },
        "aggregations": aggregations,
    })
}

/// A search response body with zero hits and no aggregations
pub fn empty_search_response() -> Value {
    json!({ "hits": { "total": { "value": 0 } } })
}
