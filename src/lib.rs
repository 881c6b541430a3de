//! Smartlog Analytics - Equipment log ingestion and aggregation backend
//!
//! This library ingests parsed equipment log files into a document store and
//! answers ad-hoc analytic queries over them:
//! - File inventories with per-file entry counts and timestamp bounds
//! - Overview statistics (totals, averages, std-deviation of per-file counts)
//! - Event-frequency breakdowns by firmware and event code
//! - Time and firmware histograms with dense, zero-filled code columns
//!
//! # Architecture
//!
//! ```text
//! [HTTP layer] → [LogDatabase] → [views + shapers] → [DocumentStore] → [search engine]
//!                     ↓                 ↓
//!                 [bootstrap]      [pagination]
//! ```
//!
//! The document store protocol is abstracted behind the
//! [`store::DocumentStore`] trait, with an HTTP implementation for
//! Elasticsearch-compatible engines and a scripted in-memory mock for tests.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod analytics;
pub mod error;
pub mod models;
pub mod query;
pub mod store;
pub mod types;

/// Configuration management with TOML support
pub mod config;

// Re-export main types
pub use analytics::LogDatabase;
pub use error::{Error, Result, StoreError};
pub use types::{LogEntry, LogFile, TimeWindow};
