//! HTTP transport seam for the catalog adapter
//!
//! The adapter talks to the remote catalog through the `CatalogTransport`
//! trait so that retry, caching and response mapping can be exercised
//! without a network. `HttpTransport` is the production implementation;
//! `MockTransport` scripts responses for tests.

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;

use super::CatalogError;

/// Environment variable holding the catalog API token.
pub const CATALOG_TOKEN_ENV: &str = "CATALOG_API_TOKEN";

/// Raw outcome of one HTTP attempt: status plus parsed body.
#[derive(Debug, Clone)]
pub struct TransportResponse {
    pub status: u16,
    pub body: Value,
}

impl TransportResponse {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

/// One GET against the remote catalog. Transport-level failures (DNS,
/// connect, timeout) surface as `CatalogError::Transport` and are retried
/// by the adapter; HTTP statuses come back in the response for the adapter
/// to classify.
#[async_trait]
pub trait CatalogTransport: Send + Sync {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<TransportResponse, CatalogError>;
}

/// Production transport over reqwest with the catalog token header.
pub struct HttpTransport {
    client: reqwest::Client,
    base_url: String,
    api_token: String,
}

impl HttpTransport {
    pub fn new(base_url: &str, api_token: String, timeout: Duration) -> Result<Self, CatalogError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| CatalogError::Transport(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_token,
        })
    }

    /// Build a transport from config, reading the token from the
    /// environment (`CATALOG_API_TOKEN`).
    pub fn from_config(config: &crate::config::CatalogConfig) -> Result<Self, CatalogError> {
        let token = std::env::var(CATALOG_TOKEN_ENV)
            .map_err(|_| CatalogError::Transport(format!("{} not set", CATALOG_TOKEN_ENV)))?;
        Self::new(&config.base_url, token, config.request_timeout())
    }
}

#[async_trait]
impl CatalogTransport for HttpTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<TransportResponse, CatalogError> {
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("TOKEN", &self.api_token)
            .header("Accept", "application/json")
            .query(query)
            .send()
            .await
            .map_err(|e| CatalogError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let body = response.json().await.unwrap_or(Value::Null);

        Ok(TransportResponse::new(status, body))
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Never print the token
        f.debug_struct("HttpTransport")
            .field("base_url", &self.base_url)
            .finish()
    }
}

/// Scripted transport for tests: one-shot queued responses take precedence,
/// then per-path routes; unmatched requests get a 404.
#[derive(Default)]
pub struct MockTransport {
    routes: std::sync::Mutex<std::collections::HashMap<String, TransportResponse>>,
    queued: std::sync::Mutex<std::collections::VecDeque<Result<TransportResponse, CatalogError>>>,
    calls: std::sync::Mutex<Vec<String>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a fixed response for a path.
    pub fn route(self, path: &str, status: u16, body: Value) -> Self {
        self.routes
            .lock()
            .unwrap()
            .insert(path.to_string(), TransportResponse::new(status, body));
        self
    }

    /// Queue a one-shot response consumed before any route.
    pub fn push(&self, status: u16, body: Value) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Ok(TransportResponse::new(status, body)));
    }

    /// Queue a one-shot transport failure.
    pub fn push_failure(&self, message: &str) {
        self.queued
            .lock()
            .unwrap()
            .push_back(Err(CatalogError::Transport(message.to_string())));
    }

    /// Every request made so far, rendered as `path?k=v&...`.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }
}

#[async_trait]
impl CatalogTransport for MockTransport {
    async fn get(&self, path: &str, query: &[(&str, String)]) -> Result<TransportResponse, CatalogError> {
        let rendered = if query.is_empty() {
            path.to_string()
        } else {
            let pairs: Vec<String> = query.iter().map(|(k, v)| format!("{}={}", k, v)).collect();
            format!("{}?{}", path, pairs.join("&"))
        };
        self.calls.lock().unwrap().push(rendered);

        if let Some(next) = self.queued.lock().unwrap().pop_front() {
            return next;
        }

        match self.routes.lock().unwrap().get(path) {
            Some(response) => Ok(response.clone()),
            None => Ok(TransportResponse::new(404, Value::Null)),
        }
    }
}
