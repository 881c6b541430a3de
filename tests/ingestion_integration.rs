//! Integration tests for the ingestion service
//!
//! These tests validate the complete ingestion flow against the scripted
//! store: bootstrap, duplicate guarding, bulk tagging through the ingest
//! pipeline, post-insert visibility refresh, and deletion.

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use serde_json::json;

use smartlog_analytics::store::mock::{empty_search_response, search_response};
use smartlog_analytics::store::{MockStore, StoreCall};
use smartlog_analytics::{Error, LogDatabase, LogEntry, LogFile};

// ============================================================================
// Helper Functions
// ============================================================================

fn sample_log_file(name: &str, entries: usize) -> LogFile {
    let entries = (0..entries)
        .map(|i| LogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, i as u32).unwrap(),
            code: "AplCmdErrorUnitSubunit".to_string(),
            description: "AplCmdErrorUnitSubunit".to_string(),
            ini_filename: "MAPK_Unit_v2_02_00.ini".to_string(),
            subunit: 0,
            type_um: "HEX".to_string(),
            unit: 1,
            unit_subunit_id: 0,
            value: "0x0000".to_string(),
            color: "0xFFADFF2F".to_string(),
            snapshot: "0".to_string(),
        })
        .collect();
    LogFile {
        filename: name.to_string(),
        entries,
    }
}

async fn ready_database(mock: Arc<MockStore>) -> LogDatabase {
    let db = LogDatabase::new(mock, "test_smartlog");
    db.ensure_ready().await.expect("bootstrap failed");
    db
}

// ============================================================================
// Bootstrap
// ============================================================================

#[tokio::test]
async fn bootstrap_creates_index_and_pipeline_once() {
    let mock = Arc::new(MockStore::new());
    let db = LogDatabase::new(mock.clone(), "test_smartlog");

    db.ensure_ready().await.unwrap();
    db.ensure_ready().await.unwrap();

    let calls = mock.calls();
    assert_eq!(
        calls,
        vec![
            StoreCall::IndexExists {
                index: "test_smartlog".to_string()
            },
            StoreCall::CreateIndex {
                index: "test_smartlog".to_string()
            },
            StoreCall::PutPipeline {
                id: "test_smartlog-pipeline".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn bootstrap_skips_creation_when_index_exists() {
    let mock = Arc::new(MockStore::new());
    mock.set_index_exists(true);
    let db = LogDatabase::new(mock.clone(), "test_smartlog");

    db.ensure_ready().await.unwrap();

    assert_eq!(mock.calls().len(), 1);
}

#[tokio::test]
async fn views_fail_before_bootstrap() {
    let mock = Arc::new(MockStore::new());
    let db = LogDatabase::new(mock, "test_smartlog");
    assert!(matches!(
        db.stored_files().await,
        Err(Error::NotBootstrapped)
    ));
}

// ============================================================================
// Upload
// ============================================================================

#[tokio::test]
async fn upload_returns_submitted_entry_count() {
    let mock = Arc::new(MockStore::with_responses(vec![empty_search_response()]));
    let db = ready_database(mock.clone()).await;

    let count = db.upload(&sample_log_file("test.log", 3)).await.unwrap();
    assert_eq!(count, 3);

    // Duplicate check search, then bulk through the pipeline, then refresh
    let calls = mock.calls();
    let tail = &calls[calls.len() - 2..];
    assert_eq!(
        tail,
        [
            StoreCall::Bulk {
                index: "test_smartlog".to_string(),
                pipeline: "test_smartlog-pipeline".to_string(),
                documents: 3,
            },
            StoreCall::Refresh {
                index: "test_smartlog".to_string()
            },
        ]
    );
}

#[tokio::test]
async fn duplicate_upload_is_rejected_without_insert() {
    // First duplicate check sees nothing, second sees the stored entries
    let mock = Arc::new(MockStore::with_responses(vec![
        empty_search_response(),
        search_response(3, json!({})),
    ]));
    let db = ready_database(mock.clone()).await;

    let file = sample_log_file("test.log", 3);
    db.upload(&file).await.unwrap();

    let err = db.upload(&file).await.unwrap_err();
    assert!(matches!(err, Error::DuplicateUpload { .. }));
    assert_eq!(err.to_string(), "Log file already uploaded!");

    // Exactly one bulk call: the failed attempt never inserted
    let bulk_calls = mock
        .calls()
        .iter()
        .filter(|call| matches!(call, StoreCall::Bulk { .. }))
        .count();
    assert_eq!(bulk_calls, 1);
}

#[tokio::test]
async fn upload_checks_duplicates_by_exact_file_name() {
    let mock = Arc::new(MockStore::with_responses(vec![empty_search_response()]));
    let db = ready_database(mock.clone()).await;

    db.upload(&sample_log_file("tagged.log", 2)).await.unwrap();

    let body = &mock.search_bodies()[0];
    assert_eq!(body["size"], 0);
    assert_eq!(
        body["query"]["bool"]["must"][0]["term"]["file"]["value"],
        "tagged.log"
    );
}

// ============================================================================
// Delete
// ============================================================================

#[tokio::test]
async fn delete_reports_store_count() {
    let mock = Arc::new(MockStore::new());
    mock.set_deleted_count(12);
    let db = ready_database(mock.clone()).await;

    assert_eq!(db.delete("test.log").await.unwrap(), 12);

    let has_delete = mock.calls().iter().any(|call| {
        matches!(call, StoreCall::DeleteByQuery { index, query }
            if index == "test_smartlog"
                && query["bool"]["must"][0]["term"]["file"]["value"] == "test.log")
    });
    assert!(has_delete);
}
