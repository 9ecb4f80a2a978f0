//! HTTP client for the booking API.
//!
//! Endpoint groups live in the submodules as further `impl ApiClient` blocks;
//! this file owns transport, status classification and body decoding.

pub mod interceptor;
pub mod models;

mod appointments;
mod auth;
mod catalog;
mod feedback;
mod users;

pub use interceptor::RequestInterceptor;

use std::time::Duration;

use reqwest::{Method, RequestBuilder, Response, Url};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{AppError, AppResult};
use crate::storage::SharedTokenStore;

use models::Validate;

#[derive(Clone)]
pub struct ApiClient {
    base: Url,
    client: reqwest::Client,
    interceptor: RequestInterceptor,
}

impl ApiClient {
    pub fn new(base_url: &str, timeout: Duration, store: SharedTokenStore) -> AppResult<Self> {
        let base = parse_base(base_url)?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::internal("http_client".to_string(), e.to_string()))?;
        Ok(Self { base, client, interceptor: RequestInterceptor::new(store) })
    }

    pub fn from_config(cfg: &ClientConfig, store: SharedTokenStore) -> AppResult<Self> {
        Self::new(&cfg.base_url, cfg.timeout(), store)
    }

    pub fn base_url(&self) -> &Url { &self.base }

    pub fn interceptor(&self) -> &RequestInterceptor { &self.interceptor }

    fn url(&self, path: &str) -> AppResult<Url> {
        self.base
            .join(path.trim_start_matches('/'))
            .map_err(|e| AppError::internal("invalid_path".to_string(), format!("{}: {}", path, e)))
    }

    /// Builder for `method path` with the interceptor's headers already applied.
    fn request(&self, method: Method, path: &str) -> AppResult<RequestBuilder> {
        let url = self.url(path)?;
        Ok(self.client.request(method, url).headers(self.interceptor.authorize()))
    }

    /// Send and classify the status. Non-success bodies are read for the server message.
    async fn execute(&self, rb: RequestBuilder, endpoint: &str) -> AppResult<Response> {
        let resp = rb.send().await?;
        let status = resp.status();
        debug!(endpoint, status = status.as_u16(), "api response");
        if status.is_success() {
            return Ok(resp);
        }
        let body = resp.text().await.unwrap_or_default();
        Err(AppError::from_status(status.as_u16(), &body))
    }

    async fn fetch<T: DeserializeOwned + Validate>(&self, rb: RequestBuilder, endpoint: &str) -> AppResult<T> {
        let resp = self.execute(rb, endpoint).await?;
        let bytes = resp.bytes().await?;
        let value: T = serde_json::from_slice(&bytes)
            .map_err(|e| AppError::malformed("unexpected_schema".to_string(), format!("{}: {}", endpoint, e)))?;
        value.validate()?;
        Ok(value)
    }

    /// For calls whose response body the client does not use.
    async fn submit(&self, rb: RequestBuilder, endpoint: &str) -> AppResult<()> {
        self.execute(rb, endpoint).await.map(|_| ())
    }
}

// Url::join drops the last path segment unless the base ends with '/'.
fn parse_base(raw: &str) -> AppResult<Url> {
    let trimmed = raw.trim();
    let with_slash = if trimmed.ends_with('/') { trimmed.to_string() } else { format!("{}/", trimmed) };
    let url = Url::parse(&with_slash)
        .map_err(|e| AppError::validation("invalid_base_url".to_string(), format!("'{}': {}", raw, e)))?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(AppError::validation("invalid_base_url".to_string(), format!("unsupported scheme '{}'", other))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use crate::storage::MemoryStore;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(base, Duration::from_secs(1), Arc::new(MemoryStore::new())).unwrap()
    }

    #[test]
    fn paths_join_under_the_base_prefix() {
        let c = client("http://api.local:8000/v1");
        assert_eq!(c.url("/appointment/3").unwrap().as_str(), "http://api.local:8000/v1/appointment/3");
        assert_eq!(c.url("feedback/unreaded").unwrap().as_str(), "http://api.local:8000/v1/feedback/unreaded");
        let c = client("http://192.168.1.10:8000");
        assert_eq!(c.url("auth/login").unwrap().as_str(), "http://192.168.1.10:8000/auth/login");
    }

    #[test]
    fn bad_base_urls_are_validation_errors() {
        let store: SharedTokenStore = Arc::new(MemoryStore::new());
        for raw in ["not a url", "ftp://files.local/"] {
            let err = ApiClient::new(raw, Duration::from_secs(1), store.clone()).err().unwrap();
            assert!(matches!(err, AppError::Validation { .. }), "{}", raw);
        }
    }
}
