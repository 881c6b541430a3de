//! Idempotent index and ingest pipeline creation
//!
//! The backing index carries a fixed field-type mapping and an ingest-time
//! normalization pipeline: the entry timestamp is rewritten from ISO-8601
//! into the store's nanosecond timestamp format under a fixed timezone, and
//! two presentation-only fields are pruned before indexing.

use serde_json::{json, Value};
use tracing::info;

use crate::error::StoreError;

use super::traits::DocumentStore;

/// Timezone applied when normalizing entry timestamps at ingest
const PIPELINE_TIMEZONE: &str = "Europe/Rome";

/// Nanosecond output format for the normalized timestamp
const PIPELINE_OUTPUT_FORMAT: &str = "yyyy-MM-dd'T'HH:mm:ss.SSSSSSSSSXXX";

/// The fixed field-type mapping for the log index
pub fn index_mappings() -> Value {
    json!({
        "properties": {
            "@timestamp": { "type": "date_nanos" },
            "code": { "type": "keyword" },
            "description": { "type": "text" },
            "file": { "type": "keyword" },
            "ini_filename": { "type": "keyword" },
            "subunit": { "type": "long" },
            "timestamp": { "type": "date_nanos", "format": "iso8601" },
            "type_um": { "type": "keyword" },
            "unit": { "type": "long" },
            "unit_subunit_id": { "type": "long" },
            "value": { "type": "keyword" },
        }
    })
}

/// The ingest pipeline body: timestamp normalization plus field pruning
pub fn ingest_pipeline() -> Value {
    json!({
        "processors": [
            {
                "date": {
                    "field": "timestamp",
                    "timezone": PIPELINE_TIMEZONE,
                    "formats": ["ISO8601"],
                    "output_format": PIPELINE_OUTPUT_FORMAT,
                }
            },
            { "remove": { "field": ["color", "snapshot"] } },
        ]
    })
}

/// Create the index and its pipeline if the index does not exist yet
///
/// Safe to call concurrently: racing callers may both observe "not yet
/// created" and issue redundant create calls, which the store treats as
/// non-fatal.
pub async fn ensure_index(
    store: &dyn DocumentStore,
    index: &str,
    pipeline: &str,
) -> Result<(), StoreError> {
    if store.index_exists(index).await? {
        return Ok(());
    }
    info!(index, "creating log index and ingest pipeline");
    store.create_index(index, &index_mappings()).await?;
    store.put_pipeline(pipeline, &ingest_pipeline()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mock::{MockStore, StoreCall};

    #[test]
    fn test_mapping_field_types() {
        let mappings = index_mappings();
        let properties = &mappings["properties"];
        assert_eq!(properties["@timestamp"]["type"], "date_nanos");
        assert_eq!(properties["code"]["type"], "keyword");
        assert_eq!(properties["description"]["type"], "text");
        assert_eq!(properties["unit_subunit_id"]["type"], "long");
        assert_eq!(properties["timestamp"]["format"], "iso8601");
    }

    #[test]
    fn test_pipeline_prunes_presentation_fields() {
        let pipeline = ingest_pipeline();
        let processors = pipeline["processors"].as_array().unwrap();
        assert_eq!(processors.len(), 2);
        assert_eq!(processors[0]["date"]["timezone"], "Europe/Rome");
        assert_eq!(
            processors[1]["remove"]["field"],
            serde_json::json!(["color", "snapshot"])
        );
    }

    #[tokio::test]
    async fn test_ensure_index_creates_when_absent() {
        let mock = MockStore::new();
        ensure_index(&mock, "smartlog", "smartlog-pipeline")
            .await
            .unwrap();

        let calls = mock.calls();
        assert!(matches!(calls[0], StoreCall::IndexExists { .. }));
        assert!(matches!(calls[1], StoreCall::CreateIndex { .. }));
        assert!(matches!(calls[2], StoreCall::PutPipeline { .. }));
    }

    #[tokio::test]
    async fn test_ensure_index_skips_when_present() {
        let mock = MockStore::new();
        mock.set_index_exists(true);
        ensure_index(&mock, "smartlog", "smartlog-pipeline")
            .await
            .unwrap();

        assert_eq!(mock.calls().len(), 1);
    }
}
