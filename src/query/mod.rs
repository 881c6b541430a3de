//! Filter predicates and aggregation specifications
//!
//! The filter dimensions and aggregation shapes of this backend are fixed
//! and enumerated, not composable by callers: every view assembles its
//! request from the builders here. Specs are plain JSON values in the
//! document store's query DSL; the store treats them as opaque bodies.

use serde::Serialize;
use serde_json::{json, Value};

use crate::types::TimeWindow;

/// Maximum distinct bucket keys a composite aggregation returns per page
///
/// Any grouping whose key cardinality may exceed this must go through the
/// cursor pagination in [`crate::store::paginate_composite`].
pub const COMPOSITE_PAGE_SIZE: u64 = 1000;

/// Target bucket count for the auto-sized time histogram
pub const TIME_HISTOGRAM_BUCKETS: u64 = 120;

/// Terms size used when collecting per-file counts for overview statistics.
/// Effectively unbounded; the statistics pipeline runs store-side over all
/// buckets in a single request.
const OVERVIEW_FILE_TERMS_SIZE: u64 = 100_000_000;

/// Document field names as laid down by the index mapping
pub mod fields {
    /// Normalized entry timestamp (nanosecond date, written by the pipeline)
    pub const TIMESTAMP: &str = "@timestamp";
    /// Event code (keyword)
    pub const CODE: &str = "code";
    /// Source file tag attached at ingestion (keyword)
    pub const FILE: &str = "file";
    /// Firmware identifier (keyword)
    pub const FIRMWARE: &str = "ini_filename";
    /// Value type discriminator (keyword)
    pub const VALUE_TYPE: &str = "type_um";
    /// Recorded value (keyword)
    pub const VALUE: &str = "value";
    /// Unit/subunit instance identifier (long)
    pub const UNIT_SUBUNIT_ID: &str = "unit_subunit_id";
}

// =============================================================================
// Filter predicates
// =============================================================================

/// Builder for the boolean filter predicate attached to view queries
///
/// Clauses are AND-ed in insertion order under `bool.must`.
///
/// # Example
///
/// ```rust
/// use smartlog_analytics::query::{fields, FilterBuilder};
///
/// let filter = FilterBuilder::new()
///     .term(fields::FILE, "upload.log")
///     .build()
///     .unwrap();
/// assert!(filter["bool"]["must"].is_array());
/// ```
#[derive(Debug, Clone, Default)]
pub struct FilterBuilder {
    must: Vec<Value>,
}

impl FilterBuilder {
    /// Create an empty filter
    pub fn new() -> Self {
        Self::default()
    }

    /// Exact match on a single categorical field
    pub fn term(mut self, field: &str, value: impl Serialize) -> Self {
        self.must.push(json!({ "term": { field: { "value": value } } }));
        self
    }

    /// Membership in a caller-supplied value set
    pub fn terms(mut self, field: &str, values: impl Serialize) -> Self {
        self.must.push(json!({ "terms": { field: values } }));
        self
    }

    /// Inclusive timestamp range over the normalized timestamp field
    pub fn within(mut self, window: &TimeWindow) -> Self {
        self.must.push(json!({
            "range": {
                fields::TIMESTAMP: {
                    "gte": window.start.to_rfc3339(),
                    "lte": window.end.to_rfc3339(),
                }
            }
        }));
        self
    }

    /// The fixed categorical predicate shared by the frequency and chart
    /// views: binary-type entries whose value is "ON"
    pub fn binary_on(self) -> Self {
        self.term(fields::VALUE_TYPE, "BIN").term(fields::VALUE, "ON")
    }

    /// Assemble the `bool` query, or `None` when no clause was added
    pub fn build(self) -> Option<Value> {
        if self.must.is_empty() {
            return None;
        }
        Some(json!({ "bool": { "must": self.must } }))
    }
}

// =============================================================================
// Aggregation specifications
// =============================================================================

/// Composite aggregation grouping by one or more keyword/numeric fields
///
/// `sources` pairs the bucket key name with the document field it groups on.
pub fn composite(sources: &[(&str, &str)]) -> Value {
    let sources: Vec<Value> = sources
        .iter()
        .map(|(name, field)| json!({ *name: { "terms": { "field": *field } } }))
        .collect();
    json!({
        "composite": {
            "size": COMPOSITE_PAGE_SIZE,
            "sources": sources,
        }
    })
}

/// Composite aggregation with nested sub-aggregations per bucket
pub fn composite_with_aggs(sources: &[(&str, &str)], aggs: Value) -> Value {
    let mut spec = composite(sources);
    spec["aggs"] = aggs;
    spec
}

/// Min/max sub-aggregations over the normalized timestamp
///
/// Used nested per file bucket and standalone for the global bounds query.
pub fn min_max_timestamp() -> Value {
    json!({
        "min_timestamp": { "min": { "field": fields::TIMESTAMP } },
        "max_timestamp": { "max": { "field": fields::TIMESTAMP } },
    })
}

/// Overview statistics: per-file counts plus store-side pipeline statistics
/// (max-count bucket identity, sum/avg/std-deviation) over those counts
pub fn overview_aggs() -> Value {
    json!({
        "file": { "terms": { "field": fields::FILE, "size": OVERVIEW_FILE_TERMS_SIZE } },
        "max_count": { "max_bucket": { "buckets_path": "file>_count" } },
        "ext_stats": { "extended_stats_bucket": { "buckets_path": "file>_count" } },
    })
}

/// Nested per-code breakdown restricted to the caller's selected codes
///
/// The terms size is never zero even when `codes` is empty (the store
/// rejects a zero-size terms request); the filter itself still restricts to
/// the empty set, yielding an empty but valid breakdown.
pub fn filtered_code_terms(codes: &[String]) -> Value {
    json!({
        "filtered": {
            "filter": { "terms": { fields::CODE: codes } },
            "aggs": {
                "code": {
                    "terms": { "field": fields::CODE, "size": codes.len().max(1) }
                }
            },
        }
    })
}

/// Auto-sized time buckets with the nested filtered per-code breakdown
pub fn time_histogram(codes: &[String]) -> Value {
    json!({
        "events_over_time": {
            "auto_date_histogram": {
                "field": fields::TIMESTAMP,
                "buckets": TIME_HISTOGRAM_BUCKETS,
            },
            "aggs": filtered_code_terms(codes),
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn window() -> TimeWindow {
        TimeWindow::new(
            Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_empty_filter_builds_none() {
        assert!(FilterBuilder::new().build().is_none());
    }

    #[test]
    fn test_filter_clause_order() {
        let filter = FilterBuilder::new()
            .binary_on()
            .within(&window())
            .terms(fields::UNIT_SUBUNIT_ID, [1, 2])
            .build()
            .unwrap();
        let must = filter["bool"]["must"].as_array().unwrap();
        assert_eq!(must.len(), 4);
        assert_eq!(must[0]["term"]["type_um"]["value"], "BIN");
        assert_eq!(must[1]["term"]["value"]["value"], "ON");
        assert!(must[2]["range"]["@timestamp"]["gte"].is_string());
        assert_eq!(must[3]["terms"]["unit_subunit_id"][0], 1);
    }

    #[test]
    fn test_range_bounds_are_inclusive() {
        let filter = FilterBuilder::new().within(&window()).build().unwrap();
        let range = &filter["bool"]["must"][0]["range"]["@timestamp"];
        assert!(range.get("gte").is_some());
        assert!(range.get("lte").is_some());
        assert!(range.get("gt").is_none());
        assert!(range.get("lt").is_none());
    }

    #[test]
    fn test_composite_page_size() {
        let spec = composite(&[("filename", fields::FILE)]);
        assert_eq!(spec["composite"]["size"], 1000);
        assert_eq!(
            spec["composite"]["sources"][0]["filename"]["terms"]["field"],
            "file"
        );
    }

    #[test]
    fn test_composite_with_nested_aggs() {
        let spec = composite_with_aggs(&[("filename", fields::FILE)], min_max_timestamp());
        assert_eq!(
            spec["aggs"]["min_timestamp"]["min"]["field"],
            "@timestamp"
        );
    }

    #[test]
    fn test_filtered_code_terms_never_sizes_zero() {
        let spec = filtered_code_terms(&[]);
        assert_eq!(spec["filtered"]["aggs"]["code"]["terms"]["size"], 1);
        assert_eq!(
            spec["filtered"]["filter"]["terms"]["code"]
                .as_array()
                .unwrap()
                .len(),
            0
        );

        let spec = filtered_code_terms(&["A".to_string(), "B".to_string()]);
        assert_eq!(spec["filtered"]["aggs"]["code"]["terms"]["size"], 2);
    }

    #[test]
    fn test_time_histogram_targets_120_buckets() {
        let spec = time_histogram(&["A".to_string()]);
        assert_eq!(
            spec["events_over_time"]["auto_date_histogram"]["buckets"],
            120
        );
    }
}
