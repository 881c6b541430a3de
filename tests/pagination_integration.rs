//! Integration tests for the cursor-driven pagination engine
//!
//! The pagination contract: issue a zero-hit search, collect buckets,
//! echo the `after_key` cursor back into the spec, and stop on the first
//! response without a cursor.

use serde_json::json;

use smartlog_analytics::query;
use smartlog_analytics::store::mock::search_response;
use smartlog_analytics::store::{paginate_composite, MockStore};

#[tokio::test]
async fn two_page_aggregation_concatenates_buckets_in_page_order() {
    let mock = MockStore::with_responses(vec![
        search_response(
            5,
            json!({
                "agg": {
                    "buckets": [
                        { "key": { "code": "k1" }, "doc_count": 10 },
                        { "key": { "code": "k2" }, "doc_count": 20 },
                        { "key": { "code": "k3" }, "doc_count": 30 }
                    ],
                    "after_key": { "code": "k3" }
                }
            }),
        ),
        search_response(
            5,
            json!({
                "agg": {
                    "buckets": [
                        { "key": { "code": "k4" }, "doc_count": 40 },
                        { "key": { "code": "k5" }, "doc_count": 50 }
                    ]
                }
            }),
        ),
    ]);

    let buckets = paginate_composite(
        &mock,
        "smartlog",
        query::composite(&[("code", query::fields::CODE)]),
        None,
    )
    .await
    .unwrap();

    // 5 buckets concatenated in page order, exactly 2 requests
    assert_eq!(buckets.len(), 5);
    let keys: Vec<&str> = buckets.iter().map(|b| b.key_str("code").unwrap()).collect();
    assert_eq!(keys, ["k1", "k2", "k3", "k4", "k5"]);
    assert_eq!(mock.search_bodies().len(), 2);
}

#[tokio::test]
async fn cursor_is_written_into_the_follow_up_request() {
    let mock = MockStore::with_responses(vec![
        search_response(
            1,
            json!({
                "agg": {
                    "buckets": [ { "key": { "code": "k3" }, "doc_count": 1 } ],
                    "after_key": { "code": "k3" }
                }
            }),
        ),
        search_response(1, json!({ "agg": { "buckets": [] } })),
    ]);

    paginate_composite(
        &mock,
        "smartlog",
        query::composite(&[("code", query::fields::CODE)]),
        None,
    )
    .await
    .unwrap();

    let bodies = mock.search_bodies();
    assert!(bodies[0]["aggs"]["agg"]["composite"].get("after").is_none());
    assert_eq!(bodies[1]["aggs"]["agg"]["composite"]["after"], json!({ "code": "k3" }));
    // The page size and sources stay unchanged across pages
    assert_eq!(
        bodies[0]["aggs"]["agg"]["composite"]["sources"],
        bodies[1]["aggs"]["agg"]["composite"]["sources"]
    );
}

#[tokio::test]
async fn every_request_is_a_zero_hit_search() {
    let mock = MockStore::with_responses(vec![search_response(
        100,
        json!({ "agg": { "buckets": [] } }),
    )]);

    paginate_composite(
        &mock,
        "smartlog",
        query::composite(&[("code", query::fields::CODE)]),
        None,
    )
    .await
    .unwrap();

    assert_eq!(mock.search_bodies()[0]["size"], 0);
}
