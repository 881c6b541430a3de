//! The six aggregation views
//!
//! Each view composes a filter predicate and an aggregation spec, executes
//! it (through the cursor pagination where the grouping key cardinality is
//! unbounded, as a single request where it is not), and hands the raw
//! buckets to the shapers. Views whose window matches nothing return the
//! defined empty result; that is never an error.

use serde_json::json;
use tracing::debug;

use crate::error::Result;
use crate::models::{
    ChartFilterData, HistogramRow, LogFrequencyEntry, LogOverview, StoredLogList,
};
use crate::query::{self, fields, FilterBuilder};
use crate::store::paginate_composite;
use crate::types::TimeWindow;

use super::{shape, LogDatabase};

impl LogDatabase {
    /// Inventory of every stored log file plus global timestamp bounds
    ///
    /// Groups all entries by file name (paginated; the number of stored
    /// files is unbounded) with per-file timestamp bounds, then issues one
    /// global min/max query. On an empty store the list is empty, the
    /// minimum defaults to the epoch and the maximum to the far-future
    /// sentinel.
    pub async fn stored_files(&self) -> Result<StoredLogList> {
        self.require_ready()?;
        let agg = query::composite_with_aggs(
            &[("filename", fields::FILE)],
            query::min_max_timestamp(),
        );
        let buckets =
            paginate_composite(self.store(), self.index_name(), agg, None).await?;

        let body = json!({ "size": 0, "aggs": query::min_max_timestamp() });
        let global = self.store().search(self.index_name(), &body).await?;

        Ok(shape::stored_log_list(&buckets, &global)?)
    }

    /// Overview statistics over per-file entry counts within a window
    ///
    /// A single request: the store computes the statistics pipeline over
    /// all per-file buckets server-side, so no pagination is involved. A
    /// window with zero documents short-circuits to the zero overview
    /// without touching the aggregation payload.
    pub async fn overview(&self, window: TimeWindow) -> Result<LogOverview> {
        self.require_ready()?;
        let mut body = json!({ "size": 0, "aggs": query::overview_aggs() });
        if let Some(query) = FilterBuilder::new().within(&window).build() {
            body["query"] = query;
        }

        let response = self.store().search(self.index_name(), &body).await?;
        if response.total_hits() == 0 {
            debug!("overview window matched no entries");
            return Ok(LogOverview::empty());
        }
        Ok(shape::overview(&response)?)
    }

    /// Occurrence counts per (firmware, event code) pair
    ///
    /// Restricted to binary-type "ON" entries within the window and the
    /// caller's subunit-id set. Paginated: the firmware x code key space is
    /// unbounded.
    pub async fn frequency(
        &self,
        window: TimeWindow,
        subunits: &[i64],
    ) -> Result<Vec<LogFrequencyEntry>> {
        self.require_ready()?;
        let filter = FilterBuilder::new()
            .binary_on()
            .within(&window)
            .terms(fields::UNIT_SUBUNIT_ID, subunits)
            .build();
        let agg = query::composite(&[("fw", fields::FIRMWARE), ("code", fields::CODE)]);
        let buckets =
            paginate_composite(self.store(), self.index_name(), agg, filter).await?;
        Ok(shape::frequency_entries(&buckets)?)
    }

    /// Distinct codes, firmwares and subunit ids observed within a window
    ///
    /// Fans out three independent paginated single-field enumerations
    /// concurrently and joins them; failure of any one fails the whole call
    /// with no partial result.
    pub async fn chart_filters(&self, window: TimeWindow) -> Result<ChartFilterData> {
        self.require_ready()?;
        let filter = FilterBuilder::new().binary_on().within(&window).build();

        let (codes, firmwares, subunits) = tokio::try_join!(
            paginate_composite(
                self.store(),
                self.index_name(),
                query::composite(&[("code", fields::CODE)]),
                filter.clone(),
            ),
            paginate_composite(
                self.store(),
                self.index_name(),
                query::composite(&[("firmware", fields::FIRMWARE)]),
                filter.clone(),
            ),
            paginate_composite(
                self.store(),
                self.index_name(),
                query::composite(&[("subunit", fields::UNIT_SUBUNIT_ID)]),
                filter,
            ),
        )?;

        Ok(shape::chart_filter_data(&codes, &firmwares, &subunits)?)
    }

    /// Event counts over auto-sized time buckets
    ///
    /// A single request: the bucket count is fixed at 120 by the store, so
    /// no pagination is needed. Rows carry one column per requested code,
    /// zero-filled (see [`shape`]). A window with zero documents yields an
    /// empty row list.
    pub async fn time_histogram(
        &self,
        window: TimeWindow,
        subunits: &[i64],
        codes: &[String],
    ) -> Result<Vec<HistogramRow>> {
        self.require_ready()?;
        let mut body = json!({ "size": 0, "aggs": query::time_histogram(codes) });
        if let Some(query) = FilterBuilder::new()
            .binary_on()
            .within(&window)
            .terms(fields::UNIT_SUBUNIT_ID, subunits)
            .build()
        {
            body["query"] = query;
        }

        let response = self.store().search(self.index_name(), &body).await?;
        if response.total_hits() == 0 {
            return Ok(Vec::new());
        }
        Ok(shape::time_histogram_rows(&response, codes)?)
    }

    /// Event counts grouped by firmware
    ///
    /// Paginated: the firmware key space is unbounded. Shares the histogram
    /// shaping with the time view.
    pub async fn firmware_histogram(
        &self,
        window: TimeWindow,
        firmwares: &[String],
        codes: &[String],
    ) -> Result<Vec<HistogramRow>> {
        self.require_ready()?;
        let filter = FilterBuilder::new()
            .binary_on()
            .within(&window)
            .terms(fields::FIRMWARE, firmwares)
            .build();
        let agg = query::composite_with_aggs(
            &[("firmware", fields::FIRMWARE)],
            query::filtered_code_terms(codes),
        );
        let buckets =
            paginate_composite(self.store(), self.index_name(), agg, filter).await?;
        Ok(shape::firmware_histogram_rows(&buckets, codes)?)
    }
}
