//! HTTP client for Elasticsearch-compatible document stores
//!
//! Speaks the store's JSON REST protocol with a bounded exponential-backoff
//! retry for transport-level failures. HTTP error statuses are never
//! retried; the store's answer, success or not, is authoritative.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Method, StatusCode};
use serde_json::Value;
use tracing::{debug, warn};

use crate::error::{truncate_diagnostic, StoreError};

use super::response::SearchResponse;
use super::traits::DocumentStore;

/// Retry policy with exponential backoff for transport failures
#[derive(Clone, Debug)]
pub struct RetryPolicy {
    /// Maximum number of retry attempts
    /// Default: 3
    pub max_retries: u32,

    /// Initial delay between retries
    /// Default: 100ms
    pub initial_delay: Duration,

    /// Maximum delay between retries
    /// Default: 5 seconds
    pub max_delay: Duration,

    /// Multiplier for exponential backoff
    /// Default: 2.0
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            initial_delay: Duration::from_millis(100),
            max_delay: Duration::from_secs(5),
            multiplier: 2.0,
        }
    }
}

/// Configuration for the HTTP store client
#[derive(Clone, Debug)]
pub struct HttpStoreConfig {
    /// Store base URL (e.g. "http://localhost:9200")
    pub url: String,

    /// Timeout for individual requests
    /// Default: 30 seconds
    pub request_timeout: Duration,

    /// Retry policy for transport failures
    pub retry_policy: RetryPolicy,
}

impl Default for HttpStoreConfig {
    fn default() -> Self {
        Self {
            url: "http://127.0.0.1:9200".to_string(),
            request_timeout: Duration::from_secs(30),
            retry_policy: RetryPolicy::default(),
        }
    }
}

impl HttpStoreConfig {
    /// Create a config with the given base URL
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Default::default()
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.url.is_empty() {
            return Err("store URL cannot be empty".to_string());
        }
        if !self.url.starts_with("http://") && !self.url.starts_with("https://") {
            return Err("store URL must use http:// or https://".to_string());
        }
        Ok(())
    }
}

/// reqwest-based [`DocumentStore`] implementation
pub struct HttpStore {
    base_url: String,
    http: reqwest::Client,
    retry: RetryPolicy,
}

impl HttpStore {
    /// Build a client from the configuration
    pub fn new(config: HttpStoreConfig) -> Result<Self, StoreError> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(StoreError::from)?;

        Ok(Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            http,
            retry: config.retry_policy,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Transport-level failures worth retrying; store answers never are
    fn is_transient(err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect()
    }

    /// Issue a request, retrying transport failures with backoff
    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<reqwest::Response, StoreError> {
        let mut attempt = 0u32;
        let mut delay = self.retry.initial_delay;
        loop {
            let mut request = self.http.request(method.clone(), self.url(path));
            if let Some(body) = body {
                request = request.json(body);
            }
            match request.send().await {
                Ok(response) => return Ok(response),
                Err(err) if Self::is_transient(&err) && attempt < self.retry.max_retries => {
                    attempt += 1;
                    warn!(
                        path,
                        attempt,
                        error = %err,
                        "transient store transport failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                    delay = delay.mul_f64(self.retry.multiplier).min(self.retry.max_delay);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }

    async fn bad_status(response: reqwest::Response) -> StoreError {
        let status = response.status().as_u16();
        let body = response.text().await.unwrap_or_default();
        StoreError::BadStatus {
            status,
            body: truncate_diagnostic(&body),
        }
    }
}

#[async_trait]
impl DocumentStore for HttpStore {
    async fn index_exists(&self, index: &str) -> Result<bool, StoreError> {
        let response = self.send(Method::HEAD, &format!("/{}", index), None).await?;
        match response.status() {
            StatusCode::OK => Ok(true),
            StatusCode::NOT_FOUND => Ok(false),
            _ => Err(Self::bad_status(response).await),
        }
    }

    async fn create_index(&self, index: &str, mappings: &Value) -> Result<(), StoreError> {
        let body = serde_json::json!({ "mappings": mappings });
        let response = self
            .send(Method::PUT, &format!("/{}", index), Some(&body))
            .await?;
        if response.status().is_success() {
            return Ok(());
        }
        // Concurrent bootstrap callers can race the existence check; the
        // store answering "already exists" is success for our purposes.
        let status = response.status().as_u16();
        let text = response.text().await.unwrap_or_default();
        if text.contains("resource_already_exists_exception") {
            debug!(index, "index already existed");
            return Ok(());
        }
        Err(StoreError::BadStatus {
            status,
            body: truncate_diagnostic(&text),
        })
    }

    async fn put_pipeline(&self, id: &str, body: &Value) -> Result<(), StoreError> {
        let response = self
            .send(Method::PUT, &format!("/_ingest/pipeline/{}", id), Some(body))
            .await?;
        if !response.status().is_success() {
            return Err(Self::bad_status(response).await);
        }
        Ok(())
    }

    async fn search(&self, index: &str, body: &Value) -> Result<SearchResponse, StoreError> {
        let response = self
            .send(Method::POST, &format!("/{}/_search", index), Some(body))
            .await?;
        if !response.status().is_success() {
            return Err(Self::bad_status(response).await);
        }
        response
            .json::<SearchResponse>()
            .await
            .map_err(|e| StoreError::InvalidResponse(truncate_diagnostic(&e.to_string())))
    }

    async fn bulk(
        &self,
        index: &str,
        pipeline: &str,
        documents: &[Value],
    ) -> Result<u64, StoreError> {
        // Bulk is not idempotent; unlike the read paths it is never retried.
        let mut ndjson = String::new();
        let action = serde_json::json!({ "index": { "_index": index } }).to_string();
        for document in documents {
            ndjson.push_str(&action);
            ndjson.push('\n');
            ndjson.push_str(&document.to_string());
            ndjson.push('\n');
        }

        let response = self
            .http
            .post(self.url(&format!("/_bulk?pipeline={}", pipeline)))
            .header("content-type", "application/x-ndjson")
            .body(ndjson)
            .send()
            .await
            .map_err(StoreError::from)?;
        if !response.status().is_success() {
            return Err(Self::bad_status(response).await);
        }

        let result: Value = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(truncate_diagnostic(&e.to_string())))?;
        let items = result["items"]
            .as_array()
            .ok_or_else(|| StoreError::InvalidResponse("bulk response has no items".to_string()))?;
        let indexed = items
            .iter()
            .filter(|item| {
                item["index"]["status"]
                    .as_u64()
                    .is_some_and(|status| status < 300)
            })
            .count() as u64;
        Ok(indexed)
    }

    async fn delete_by_query(&self, index: &str, query: &Value) -> Result<u64, StoreError> {
        let body = serde_json::json!({ "query": query });
        let response = self
            .send(
                Method::POST,
                &format!("/{}/_delete_by_query?refresh=true", index),
                Some(&body),
            )
            .await?;
        if !response.status().is_success() {
            return Err(Self::bad_status(response).await);
        }
        let result: Value = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(truncate_diagnostic(&e.to_string())))?;
        result["deleted"]
            .as_u64()
            .ok_or_else(|| StoreError::InvalidResponse("delete response has no count".to_string()))
    }

    async fn refresh(&self, index: &str) -> Result<(), StoreError> {
        let response = self
            .send(Method::POST, &format!("/{}/_refresh", index), None)
            .await?;
        if !response.status().is_success() {
            return Err(Self::bad_status(response).await);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_validation() {
        assert!(HttpStoreConfig::default().validate().is_ok());

        let config = HttpStoreConfig::with_url("");
        assert!(config.validate().is_err());

        let config = HttpStoreConfig::with_url("redis://wrong");
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_base_url_trailing_slash_stripped() {
        let store = HttpStore::new(HttpStoreConfig::with_url("http://localhost:9200/")).unwrap();
        assert_eq!(store.url("/smartlog/_search"), "http://localhost:9200/smartlog/_search");
    }

    #[test]
    fn test_retry_policy_defaults() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_retries, 3);
        assert_eq!(policy.initial_delay, Duration::from_millis(100));
    }
}
