//! Cursor-driven composite aggregation pagination
//!
//! A composite aggregation returns at most one page of distinct bucket keys
//! per request. This walker exhausts the cursor protocol: it reissues the
//! same request with the previous page's `after_key` written into the
//! spec's `composite.after` field until a page arrives without a cursor.
//! Pages are strictly sequential; each request depends on the previous
//! response.

use serde_json::{json, Value};
use tracing::debug;

use crate::error::StoreError;

use super::response::{CompositeAggregation, CompositeBucket};
use super::traits::DocumentStore;

/// Exhaust a composite aggregation, concatenating buckets in response order
///
/// `agg_spec` must carry a `composite` aggregation (optionally with nested
/// `aggs`); `filter` is attached unchanged to every page request. No
/// ordering guarantee is imposed beyond store response order concatenated
/// across pages.
pub async fn paginate_composite(
    store: &dyn DocumentStore,
    index: &str,
    mut agg_spec: Value,
    filter: Option<Value>,
) -> Result<Vec<CompositeBucket>, StoreError> {
    let mut buckets = Vec::new();
    let mut pages = 0usize;

    loop {
        let mut body = json!({ "size": 0, "aggs": { "agg": agg_spec.clone() } });
        if let Some(query) = &filter {
            body["query"] = query.clone();
        }

        let response = store.search(index, &body).await?;
        let page: CompositeAggregation = response.typed("agg")?;
        pages += 1;
        buckets.extend(page.buckets);

        match page.after_key {
            Some(after) => {
                agg_spec["composite"]["after"] = after;
            }
            None => break,
        }
    }

    debug!(index, pages, buckets = buckets.len(), "composite aggregation exhausted");
    Ok(buckets)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query;
    use crate::store::mock::{search_response, MockStore};

    #[tokio::test]
    async fn test_single_page_issues_one_request() {
        let mock = MockStore::with_responses(vec![search_response(
            2,
            json!({
                "agg": {
                    "buckets": [
                        { "key": { "code": "A" }, "doc_count": 1 },
                        { "key": { "code": "B" }, "doc_count": 1 }
                    ]
                }
            }),
        )]);

        let buckets = paginate_composite(
            &mock,
            "smartlog",
            query::composite(&[("code", query::fields::CODE)]),
            None,
        )
        .await
        .unwrap();

        assert_eq!(buckets.len(), 2);
        assert_eq!(mock.search_bodies().len(), 1);
    }

    #[tokio::test]
    async fn test_multi_page_concatenates_and_echoes_cursor() {
        let mock = MockStore::with_responses(vec![
            search_response(
                5,
                json!({
                    "agg": {
                        "buckets": [
                            { "key": { "filename": "a.log" }, "doc_count": 1 },
                            { "key": { "filename": "b.log" }, "doc_count": 2 },
                            { "key": { "filename": "c.log" }, "doc_count": 3 }
                        ],
                        "after_key": { "filename": "c.log" }
                    }
                }),
            ),
            search_response(
                5,
                json!({
                    "agg": {
                        "buckets": [
                            { "key": { "filename": "d.log" }, "doc_count": 4 },
                            { "key": { "filename": "e.log" }, "doc_count": 5 }
                        ]
                    }
                }),
            ),
        ]);

        let buckets = paginate_composite(
            &mock,
            "smartlog",
            query::composite(&[("filename", query::fields::FILE)]),
            None,
        )
        .await
        .unwrap();

        assert_eq!(buckets.len(), 5);
        let names: Vec<&str> = buckets
            .iter()
            .map(|b| b.key_str("filename").unwrap())
            .collect();
        assert_eq!(names, ["a.log", "b.log", "c.log", "d.log", "e.log"]);

        let bodies = mock.search_bodies();
        assert_eq!(bodies.len(), 2);
        // First request carries no cursor; second echoes the after_key.
        assert!(bodies[0]["aggs"]["agg"]["composite"].get("after").is_none());
        assert_eq!(
            bodies[1]["aggs"]["agg"]["composite"]["after"]["filename"],
            "c.log"
        );
    }

    #[tokio::test]
    async fn test_filter_repeated_unchanged_on_every_page() {
        let filter = json!({ "bool": { "must": [ { "term": { "file": { "value": "a.log" } } } ] } });
        let mock = MockStore::with_responses(vec![
            search_response(
                1,
                json!({
                    "agg": {
                        "buckets": [ { "key": { "code": "A" }, "doc_count": 1 } ],
                        "after_key": { "code": "A" }
                    }
                }),
            ),
            search_response(1, json!({ "agg": { "buckets": [] } })),
        ]);

        paginate_composite(
            &mock,
            "smartlog",
            query::composite(&[("code", query::fields::CODE)]),
            Some(filter.clone()),
        )
        .await
        .unwrap();

        for body in mock.search_bodies() {
            assert_eq!(body["query"], filter);
        }
    }

    #[tokio::test]
    async fn test_store_failure_propagates() {
        // Queue exhausted -> the mock reports an invalid response
        let mock = MockStore::with_responses(vec![]);
        let result = paginate_composite(
            &mock,
            "smartlog",
            query::composite(&[("code", query::fields::CODE)]),
            None,
        )
        .await;
        assert!(result.is_err());
    }
}
