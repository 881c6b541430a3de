//! Result shapers: raw aggregation buckets into typed rows
//!
//! The histogram shapers apply the dense-column rule: every requested code
//! key is present in every row, defaulted to zero, then overwritten by the
//! actual per-code counts found in the bucket. Downstream charting never
//! has to handle missing keys.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::StoreError;
use crate::models::{
    ChartFilterData, HistogramRow, LogFrequencyEntry, LogOverview, MaxCountEntry, StoredLogFile,
    StoredLogList, MAX_TIMESTAMP_MILLIS,
};
use crate::store::response::{
    CompositeBucket, DateHistogram, ExtendedStats, FilteredCodeTerms, MaxBucket, MetricValue,
    SearchResponse,
};

fn millis_to_datetime(millis: f64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(millis as i64)
        .ok_or_else(|| StoreError::InvalidResponse(format!("timestamp {} out of range", millis)))
}

/// Shape the file inventory from per-file buckets plus the global min/max
/// response
pub fn stored_log_list(
    buckets: &[CompositeBucket],
    global: &SearchResponse,
) -> Result<StoredLogList, StoreError> {
    let mut log_files = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let min: MetricValue = bucket.sub("min_timestamp")?;
        let max: MetricValue = bucket.sub("max_timestamp")?;
        let (Some(min), Some(max)) = (min.value, max.value) else {
            return Err(StoreError::InvalidResponse(
                "file bucket missing timestamp bounds".to_string(),
            ));
        };
        log_files.push(StoredLogFile {
            file_name: bucket.key_str("filename")?.to_string(),
            first_entry_timestamp: millis_to_datetime(min)?,
            last_entry_timestamp: millis_to_datetime(max)?,
            entry_count: bucket.doc_count,
        });
    }

    let min: MetricValue = global.typed("min_timestamp")?;
    let max: MetricValue = global.typed("max_timestamp")?;
    Ok(StoredLogList {
        log_files,
        min_timestamp: millis_to_datetime(min.value.unwrap_or(0.0))?,
        max_timestamp: millis_to_datetime(max.value.unwrap_or(MAX_TIMESTAMP_MILLIS as f64))?,
    })
}

/// Shape the overview statistics
///
/// Callers must have ruled out the zero-hit case first; with at least one
/// matching document every statistics field is populated.
pub fn overview(response: &SearchResponse) -> Result<LogOverview, StoreError> {
    let stats: ExtendedStats = response.typed("ext_stats")?;
    let max_count: MaxBucket = response.typed("max_count")?;
    Ok(LogOverview {
        total_entries: stats.sum as u64,
        avg_entries: stats.avg,
        max_count_entry: MaxCountEntry {
            filename: max_count.keys.first().cloned().unwrap_or_default(),
            entry_count: max_count.value as u64,
        },
        entries_std_dev: stats.std_deviation,
    })
}

/// Shape (firmware, code) frequency buckets
pub fn frequency_entries(
    buckets: &[CompositeBucket],
) -> Result<Vec<LogFrequencyEntry>, StoreError> {
    buckets
        .iter()
        .map(|bucket| {
            Ok(LogFrequencyEntry {
                firmware: bucket.key_str("fw")?.to_string(),
                event_code: bucket.key_str("code")?.to_string(),
                count: bucket.doc_count,
            })
        })
        .collect()
}

/// Combine the three filter enumerations
pub fn chart_filter_data(
    codes: &[CompositeBucket],
    firmwares: &[CompositeBucket],
    subunits: &[CompositeBucket],
) -> Result<ChartFilterData, StoreError> {
    Ok(ChartFilterData {
        codes: codes
            .iter()
            .map(|b| b.key_str("code").map(str::to_string))
            .collect::<Result<_, _>>()?,
        firmwares: firmwares
            .iter()
            .map(|b| b.key_str("firmware").map(str::to_string))
            .collect::<Result<_, _>>()?,
        subunits: subunits
            .iter()
            .map(|b| b.key_i64("subunit"))
            .collect::<Result<_, _>>()?,
    })
}

/// Zero-fill the requested codes, then overwrite with actual counts
fn fill_code_columns(
    row: &mut HistogramRow,
    codes: &[String],
    filtered: &FilteredCodeTerms,
) -> Result<(), StoreError> {
    for code in codes {
        row.set_count(code, 0);
    }
    for bucket in &filtered.code.buckets {
        let code = bucket.key.as_str().ok_or_else(|| {
            StoreError::InvalidResponse("code bucket key is not a string".to_string())
        })?;
        row.set_count(code, bucket.doc_count);
    }
    Ok(())
}

/// Shape the time histogram rows
pub fn time_histogram_rows(
    response: &SearchResponse,
    codes: &[String],
) -> Result<Vec<HistogramRow>, StoreError> {
    let histogram: DateHistogram = response.typed("events_over_time")?;
    let mut rows = Vec::with_capacity(histogram.buckets.len());
    for bucket in &histogram.buckets {
        let mut row = HistogramRow::with_group(
            "timestamp",
            Value::from(bucket.key_as_string.clone()),
            bucket.doc_count,
        );
        let filtered: FilteredCodeTerms = bucket.sub("filtered")?;
        fill_code_columns(&mut row, codes, &filtered)?;
        rows.push(row);
    }
    Ok(rows)
}

/// Shape the firmware histogram rows
pub fn firmware_histogram_rows(
    buckets: &[CompositeBucket],
    codes: &[String],
) -> Result<Vec<HistogramRow>, StoreError> {
    let mut rows = Vec::with_capacity(buckets.len());
    for bucket in buckets {
        let mut row = HistogramRow::with_group(
            "firmware",
            Value::from(bucket.key_str("firmware")?),
            bucket.doc_count,
        );
        let filtered: FilteredCodeTerms = bucket.sub("filtered")?;
        fill_code_columns(&mut row, codes, &filtered)?;
        rows.push(row);
    }
    Ok(rows)
}
