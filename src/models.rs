//! Typed query results returned by the aggregation views
//!
//! Every view defines a well-formed empty/zero result for windows that match
//! no documents; empty result sets are never errors.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Far-future timestamp reported as the global maximum when the store holds
/// no documents (2100-12-31T23:59:59Z), in epoch milliseconds.
pub const MAX_TIMESTAMP_MILLIS: i64 = 4_133_980_799_000;

/// The far-future sentinel as a `DateTime`
pub fn max_timestamp_sentinel() -> DateTime<Utc> {
    DateTime::from_timestamp_millis(MAX_TIMESTAMP_MILLIS).expect("sentinel is a valid timestamp")
}

/// Per-file summary derived from stored entries
///
/// Never persisted as its own record; recomputed on every inventory query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLogFile {
    /// Source file name
    pub file_name: String,

    /// Timestamp of the earliest entry tagged with this file
    pub first_entry_timestamp: DateTime<Utc>,

    /// Timestamp of the latest entry tagged with this file
    pub last_entry_timestamp: DateTime<Utc>,

    /// Number of stored entries tagged with this file
    pub entry_count: u64,
}

/// Inventory of every stored log file plus global timestamp bounds
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredLogList {
    /// Per-file summaries
    pub log_files: Vec<StoredLogFile>,

    /// Earliest entry timestamp across all files (epoch when the store is empty)
    pub min_timestamp: DateTime<Utc>,

    /// Latest entry timestamp across all files (far-future sentinel when empty)
    pub max_timestamp: DateTime<Utc>,
}

/// The file holding the most entries within a window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaxCountEntry {
    /// File name (empty in the zero overview)
    pub filename: String,

    /// Its entry count
    pub entry_count: u64,
}

/// Statistics-of-statistics over per-file entry counts within a time window
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogOverview {
    /// Total entries across all files in the window
    pub total_entries: u64,

    /// Average entries per file
    pub avg_entries: f64,

    /// The file with the maximum entry count
    pub max_count_entry: MaxCountEntry,

    /// Standard deviation of per-file entry counts
    pub entries_std_dev: f64,
}

impl LogOverview {
    /// The defined zero-valued overview for windows with no entries
    pub fn empty() -> Self {
        Self {
            total_entries: 0,
            avg_entries: 0.0,
            max_count_entry: MaxCountEntry {
                filename: String::new(),
                entry_count: 0,
            },
            entries_std_dev: 0.0,
        }
    }
}

/// Occurrence count for one (firmware, event code) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogFrequencyEntry {
    /// Firmware identifier
    pub firmware: String,

    /// Event code
    pub event_code: String,

    /// Matching entry count
    pub count: u64,
}

/// Distinct filter values observed within a time window
///
/// Populates the UI filter controls for the chart views.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartFilterData {
    /// Distinct subunit instance ids
    pub subunits: Vec<i64>,

    /// Distinct event codes
    pub codes: Vec<String>,

    /// Distinct firmware identifiers
    pub firmwares: Vec<String>,
}

/// One histogram bar with a dense, per-request column set
///
/// The key set varies per request: the group key (`timestamp` or
/// `firmware`), `total`, then one key per requested event code. Every
/// requested code is present even when its count is zero, so downstream
/// charting never has to handle missing keys. Insertion order is preserved
/// through serialization.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct HistogramRow(Map<String, Value>);

impl HistogramRow {
    /// Start a row from its group key and overall document count
    pub fn with_group(key_name: &str, key: Value, total: u64) -> Self {
        let mut fields = Map::new();
        fields.insert(key_name.to_string(), key);
        fields.insert("total".to_string(), Value::from(total));
        Self(fields)
    }

    /// Set (or overwrite) the count for one event code column
    pub fn set_count(&mut self, code: &str, count: u64) {
        self.0.insert(code.to_string(), Value::from(count));
    }

    /// Look up a column value
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// All columns in insertion order
    pub fn fields(&self) -> &Map<String, Value> {
        &self.0
    }
}
