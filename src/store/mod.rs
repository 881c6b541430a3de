//! Document store integration
//!
//! The backing search engine is consumed over a small request/response
//! protocol: index/pipeline management, zero-hit searches carrying
//! aggregation specs, bulk indexing through an ingest pipeline, and
//! delete-by-query. The protocol is abstracted behind the
//! [`DocumentStore`] trait so the aggregation views stay implementation
//! agnostic.
//!
//! # Modules
//!
//! - [`traits`]: the `DocumentStore` protocol seam
//! - [`http`]: reqwest-based client for Elasticsearch-compatible engines
//! - [`response`]: typed deserialization of search/aggregation payloads
//! - [`paginate`]: cursor-driven composite aggregation walker
//! - [`bootstrap`]: idempotent index mapping and pipeline creation
//! - [`mock`]: scripted in-memory store for tests

pub mod bootstrap;
pub mod http;
pub mod mock;
pub mod paginate;
pub mod response;
pub mod traits;

pub use http::{HttpStore, HttpStoreConfig, RetryPolicy};
pub use mock::{MockStore, StoreCall};
pub use paginate::paginate_composite;
pub use response::{CompositeAggregation, CompositeBucket, SearchResponse};
pub use traits::DocumentStore;
