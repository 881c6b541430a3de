//! Log database: ingestion operations and aggregation view entry points
//!
//! [`LogDatabase`] owns the store handle, the index/pipeline names, and the
//! bootstrap "ready" flag. Ingestion lives here; the six aggregation views
//! are implemented in [`views`] and their bucket-to-row reshaping in
//! [`shape`].

pub mod shape;
pub mod views;

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::query::{fields, FilterBuilder};
use crate::store::{bootstrap, DocumentStore};
use crate::types::LogFile;

/// Suffix appended to the index name to derive the ingest pipeline name
const PIPELINE_SUFFIX: &str = "-pipeline";

/// Entry point for ingestion and analytics over stored log entries
///
/// All operations require [`LogDatabase::ensure_ready`] to have completed
/// once; invoking them earlier fails with [`Error::NotBootstrapped`].
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use smartlog_analytics::store::{HttpStore, HttpStoreConfig};
/// use smartlog_analytics::LogDatabase;
///
/// # async fn example() -> smartlog_analytics::Result<()> {
/// let store = Arc::new(HttpStore::new(HttpStoreConfig::default())?);
/// let db = LogDatabase::new(store, "smartlog");
/// db.ensure_ready().await?;
/// let inventory = db.stored_files().await?;
/// # Ok(())
/// # }
/// ```
pub struct LogDatabase {
    store: Arc<dyn DocumentStore>,
    index: String,
    pipeline: String,
    ready: AtomicBool,
}

impl LogDatabase {
    /// Create a database handle over a store and index name
    pub fn new(store: Arc<dyn DocumentStore>, index: impl Into<String>) -> Self {
        let index = index.into();
        let pipeline = format!("{}{}", index, PIPELINE_SUFFIX);
        Self {
            store,
            index,
            pipeline,
            ready: AtomicBool::new(false),
        }
    }

    /// The backing index name
    pub fn index_name(&self) -> &str {
        &self.index
    }

    pub(crate) fn store(&self) -> &dyn DocumentStore {
        self.store.as_ref()
    }

    /// Create the backing index and ingest pipeline if absent
    ///
    /// Idempotent and safe under concurrent invocation: the ready flag is a
    /// relaxed cache, and racing creators are tolerated because the store
    /// treats "already exists" as success.
    pub async fn ensure_ready(&self) -> Result<()> {
        if self.ready.load(Ordering::Relaxed) {
            return Ok(());
        }
        bootstrap::ensure_index(self.store.as_ref(), &self.index, &self.pipeline).await?;
        self.ready.store(true, Ordering::Relaxed);
        Ok(())
    }

    pub(crate) fn require_ready(&self) -> Result<()> {
        if !self.ready.load(Ordering::Relaxed) {
            return Err(Error::NotBootstrapped);
        }
        Ok(())
    }

    /// Whether any stored entry is tagged with the given file name
    pub async fn already_uploaded(&self, file_name: &str) -> Result<bool> {
        self.require_ready()?;
        let query = FilterBuilder::new().term(fields::FILE, file_name).build();
        let mut body = serde_json::json!({ "size": 0 });
        if let Some(query) = query {
            body["query"] = query;
        }
        let response = self.store.search(&self.index, &body).await?;
        Ok(response.total_hits() != 0)
    }

    /// Ingest a parsed log file
    ///
    /// Fails with [`Error::DuplicateUpload`] when the file name is already
    /// present. Every entry is tagged with the file name, routed through the
    /// ingest pipeline in one bulk request, and an explicit refresh makes
    /// the documents immediately visible to subsequent reads. Returns the
    /// store-reported insert count.
    pub async fn upload(&self, log_file: &LogFile) -> Result<u64> {
        self.require_ready()?;
        if self.already_uploaded(&log_file.filename).await? {
            return Err(Error::DuplicateUpload {
                file_name: log_file.filename.clone(),
            });
        }

        let documents: Vec<Value> = log_file
            .entries
            .iter()
            .map(|entry| entry.to_document(&log_file.filename))
            .collect();

        debug!(
            file = %log_file.filename,
            entries = documents.len(),
            "bulk indexing log file"
        );
        let count = self
            .store
            .bulk(&self.index, &self.pipeline, &documents)
            .await?;
        self.store.refresh(&self.index).await?;
        info!(file = %log_file.filename, count, "log file uploaded");
        Ok(count)
    }

    /// Delete every entry tagged with the given file name
    ///
    /// Returns the deleted count. Not transactional with ingestion: a
    /// delete racing a concurrent upload of the same name is unguarded.
    pub async fn delete(&self, file_name: &str) -> Result<u64> {
        self.require_ready()?;
        let query = FilterBuilder::new()
            .term(fields::FILE, file_name)
            .build()
            .unwrap_or_default();
        let deleted = self.store.delete_by_query(&self.index, &query).await?;
        info!(file = %file_name, deleted, "log file deleted");
        Ok(deleted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::{empty_search_response, search_response, MockStore, StoreCall};
    use serde_json::json;

    fn ready_db(mock: Arc<MockStore>) -> LogDatabase {
        mock.set_index_exists(true);
        let db = LogDatabase::new(mock, "test_smartlog");
        db.ready.store(true, Ordering::Relaxed);
        db
    }

    #[tokio::test]
    async fn test_operations_require_bootstrap() {
        let mock = Arc::new(MockStore::new());
        let db = LogDatabase::new(mock, "test_smartlog");
        assert!(matches!(
            db.already_uploaded("test.log").await,
            Err(Error::NotBootstrapped)
        ));
        assert!(matches!(db.delete("test.log").await, Err(Error::NotBootstrapped)));
    }

    #[tokio::test]
    async fn test_ensure_ready_is_idempotent() {
        let mock = Arc::new(MockStore::new());
        let db = LogDatabase::new(mock.clone(), "test_smartlog");
        db.ensure_ready().await.unwrap();
        db.ensure_ready().await.unwrap();

        // Second call short-circuits on the cached flag
        let exists_checks = mock
            .calls()
            .iter()
            .filter(|call| matches!(call, StoreCall::IndexExists { .. }))
            .count();
        assert_eq!(exists_checks, 1);
    }

    #[tokio::test]
    async fn test_pipeline_name_derived_from_index() {
        let mock = Arc::new(MockStore::new());
        let db = LogDatabase::new(mock, "smartlog");
        assert_eq!(db.pipeline, "smartlog-pipeline");
    }

    #[tokio::test]
    async fn test_already_uploaded_counts_file_hits() {
        let mock = Arc::new(MockStore::with_responses(vec![
            search_response(42, json!({})),
            empty_search_response(),
        ]));
        let db = ready_db(mock.clone());

        assert!(db.already_uploaded("test.log").await.unwrap());
        assert!(!db.already_uploaded("other.log").await.unwrap());

        let body = &mock.search_bodies()[0];
        assert_eq!(body["size"], 0);
        assert_eq!(body["query"]["bool"]["must"][0]["term"]["file"]["value"], "test.log");
    }

    #[tokio::test]
    async fn test_delete_issues_delete_by_query() {
        let mock = Arc::new(MockStore::new());
        mock.set_deleted_count(7);
        let db = ready_db(mock.clone());

        let deleted = db.delete("old.log").await.unwrap();
        assert_eq!(deleted, 7);

        let calls = mock.calls();
        match &calls[0] {
            StoreCall::DeleteByQuery { query, .. } => {
                assert_eq!(query["bool"]["must"][0]["term"]["file"]["value"], "old.log");
            }
            other => panic!("unexpected call {:?}", other),
        }
    }
}
