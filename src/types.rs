//! Core data types shared across the analytics backend
//!
//! This module defines the structures exchanged with the external log
//! parser and the query time window used by every aggregation view:
//!
//! - **`LogEntry`**: a single parsed log line
//! - **`LogFile`**: a parsed upload (file name + entries)
//! - **`TimeWindow`**: inclusive start/end bounds for queries

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::error::Error;

/// A single parsed equipment log entry
///
/// Produced by the external log parser. The `color` and `snapshot` fields are
/// presentation-only and are stripped by the store's ingest pipeline; they are
/// carried here so the parser output round-trips unchanged into the bulk
/// request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Entry timestamp as reported by the equipment (ISO-8601)
    pub timestamp: DateTime<Utc>,

    /// Event code (exact-match categorical)
    pub code: String,

    /// Human-readable event description
    pub description: String,

    /// Firmware identifier the entry originates from
    pub ini_filename: String,

    /// Subunit number within the reporting unit
    pub subunit: i64,

    /// Value type discriminator (e.g. "BIN", "HEX")
    pub type_um: String,

    /// Unit identifier
    pub unit: i64,

    /// Combined unit/subunit instance identifier
    pub unit_subunit_id: i64,

    /// Recorded value (e.g. "ON", "0x0000")
    pub value: String,

    /// Display color hint (dropped at ingestion)
    pub color: String,

    /// Snapshot marker (dropped at ingestion)
    pub snapshot: String,
}

impl LogEntry {
    /// Render this entry as a store document tagged with its source file
    ///
    /// The `file` tag is what every per-file aggregation groups on; it is
    /// attached here rather than by the parser so the same entry list can be
    /// re-tagged on re-upload under a different name.
    pub fn to_document(&self, file_name: &str) -> Value {
        json!({
            "timestamp": self.timestamp.to_rfc3339(),
            "code": self.code,
            "description": self.description,
            "ini_filename": self.ini_filename,
            "subunit": self.subunit,
            "type_um": self.type_um,
            "unit": self.unit,
            "unit_subunit_id": self.unit_subunit_id,
            "value": self.value,
            "color": self.color,
            "snapshot": self.snapshot,
            "file": file_name,
        })
    }
}

/// A parsed log file ready for ingestion
///
/// The file name doubles as the upload identity: a name may be stored at
/// most once, enforced by a pre-insert existence check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogFile {
    /// Source file name (unique across stored entries)
    pub filename: String,

    /// Parsed entries in file order
    pub entries: Vec<LogEntry>,
}

/// Time window for queries (inclusive on both ends)
///
/// # Example
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use smartlog_analytics::types::TimeWindow;
///
/// let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
/// let end = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
/// let window = TimeWindow::new(start, end).unwrap();
/// assert!(window.contains(start));
/// assert!(window.contains(end));
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeWindow {
    /// Start timestamp (inclusive)
    pub start: DateTime<Utc>,

    /// End timestamp (inclusive)
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Create a new time window with validation
    ///
    /// Returns an error if `start > end`.
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Result<Self, Error> {
        if start > end {
            return Err(Error::Configuration(format!(
                "Invalid time window: start {} > end {}",
                start, end
            )));
        }
        Ok(Self { start, end })
    }

    /// Check whether a timestamp falls within this window (inclusive)
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        timestamp >= self.start && timestamp <= self.end
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn sample_entry() -> LogEntry {
        LogEntry {
            timestamp: Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap(),
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
        }
    }

    #[test]
    fn test_entry_document_carries_file_tag() {
        let doc = sample_entry().to_document("test.log");
        assert_eq!(doc["file"], "test.log");
        assert_eq!(doc["code"], "AplCmdErrorUnitSubunit");
        assert_eq!(doc["unit_subunit_id"], 0);
        // Presentation fields survive into the document; the ingest
        // pipeline strips them store-side.
        assert_eq!(doc["color"], "0xFFADFF2F");
        assert_eq!(doc["snapshot"], "0");
    }

    #[test]
    fn test_time_window_bounds_inclusive() {
        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap();
        let window = TimeWindow::new(start, end).unwrap();
        assert!(window.contains(start));
        assert!(window.contains(end));
        assert!(!window.contains(end + chrono::Duration::seconds(1)));
    }

    #[test]
    fn test_time_window_rejects_inverted_bounds() {
        let start = Utc.with_ymd_and_hms(2024, 1, 2, 0, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        assert!(TimeWindow::new(start, end).is_err());
    }
}
