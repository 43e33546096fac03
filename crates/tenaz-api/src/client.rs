//! API client with per-resource bearer binding
//!
//! One client serves both backends. Each request gets the token for the
//! resource implied by its URL prefix plus `Content-Type: application/json`;
//! extra headers and query parameters are supplied per call through the
//! request builder rather than through shared mutable state.
//!
//! Response bodies are decoded in three steps: a bare base-10 signed
//! integer (the `$count` endpoints) is wrapped as `{"value": n}`, anything
//! else is parsed as JSON, and an empty body yields no document.

use std::time::Duration;

use reqwest::{Client, Method, StatusCode};
use serde_json::{json, Value};
use tracing::{debug, error};

use tenaz_core::{Error, Result};

/// Directory/graph API base URL.
pub const GRAPH_BASE_URL: &str = "https://graph.microsoft.com";

/// Resource-management API base URL.
pub const MGMT_BASE_URL: &str = "https://management.azure.com";

/// Hard per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

/// HTTP client holding one bearer token per backend resource.
pub struct ApiClient {
    http: Client,
    graph_base: String,
    mgmt_base: String,
    graph_token: String,
    mgmt_token: String,
}

impl ApiClient {
    /// Create a client for the production base URLs.
    pub fn new(graph_token: impl Into<String>, mgmt_token: impl Into<String>) -> Self {
        Self::with_bases(graph_token, mgmt_token, GRAPH_BASE_URL, MGMT_BASE_URL)
    }

    /// Create a client with custom base URLs (used by tests).
    pub fn with_bases(
        graph_token: impl Into<String>,
        mgmt_token: impl Into<String>,
        graph_base: impl Into<String>,
        mgmt_base: impl Into<String>,
    ) -> Self {
        let http = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .expect("reqwest client construction cannot fail with static options");
        Self {
            http,
            graph_base: graph_base.into(),
            mgmt_base: mgmt_base.into(),
            graph_token: graph_token.into(),
            mgmt_token: mgmt_token.into(),
        }
    }

    /// Absolute URL on the directory/graph API.
    pub fn graph_url(&self, path: &str) -> String {
        format!("{}{}", self.graph_base, path)
    }

    /// Absolute URL on the resource-management API.
    pub fn mgmt_url(&self, path: &str) -> String {
        format!("{}{}", self.mgmt_base, path)
    }

    /// The bearer token for the resource implied by `url`, if any.
    fn bearer_for(&self, url: &str) -> Option<&str> {
        if url.starts_with(&self.graph_base) {
            Some(&self.graph_token)
        } else if url.starts_with(&self.mgmt_base) {
            Some(&self.mgmt_token)
        } else {
            None
        }
    }

    /// Start building a request.
    pub fn request(&self, method: Method, url: &str) -> ApiRequest<'_> {
        ApiRequest {
            client: self,
            method,
            url: url.to_string(),
            query: Vec::new(),
            headers: Vec::new(),
            payload: None,
        }
    }
}

/// A single API request under construction.
pub struct ApiRequest<'a> {
    client: &'a ApiClient,
    method: Method,
    url: String,
    query: Vec<(String, String)>,
    headers: Vec<(String, String)>,
    payload: Option<Value>,
}

impl ApiRequest<'_> {
    /// Add a query parameter.
    pub fn query(mut self, key: &str, value: &str) -> Self {
        self.query.push((key.to_string(), value.to_string()));
        self
    }

    /// Add a request header for this call only.
    pub fn header(mut self, key: &str, value: &str) -> Self {
        self.headers.push((key.to_string(), value.to_string()));
        self
    }

    /// Attach a JSON payload.
    pub fn json(mut self, payload: Value) -> Self {
        self.payload = Some(payload);
        self
    }

    /// Send the request and decode the response.
    pub async fn send(self) -> Result<ApiResponse> {
        if !self.url.starts_with("http") {
            return Err(Error::Format(format!("bad URL: {}", self.url)));
        }

        let mut builder = self
            .client
            .http
            .request(self.method.clone(), &self.url)
            .header("Content-Type", "application/json");

        if let Some(token) = self.client.bearer_for(&self.url) {
            builder = builder.bearer_auth(token);
        }
        for (key, value) in &self.headers {
            builder = builder.header(key, value);
        }
        if !self.query.is_empty() {
            builder = builder.query(&self.query);
        }
        if let Some(payload) = &self.payload {
            builder = builder.json(payload);
        }

        debug!(method = %self.method, url = %self.url, "sending request");
        let response = builder
            .send()
            .await
            .map_err(|e| Error::Network(format!("{} {}: {e}", self.method, self.url)))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| Error::Network(format!("{} {}: {e}", self.method, self.url)))?;

        let body = decode_body(&text)?;

        Ok(ApiResponse {
            method: self.method.to_string(),
            url: self.url,
            status,
            body,
        })
    }
}

/// Decode a response body: bare integer, JSON document, or nothing.
fn decode_body(text: &str) -> Result<Option<Value>> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    if let Ok(count) = trimmed.parse::<i64>() {
        return Ok(Some(json!({ "value": count })));
    }
    serde_json::from_str(trimmed)
        .map(Some)
        .map_err(|e| Error::Format(format!("response is neither an integer nor JSON: {e}")))
}

/// A decoded API response.
#[derive(Debug)]
pub struct ApiResponse {
    pub method: String,
    pub url: String,
    pub status: StatusCode,
    pub body: Option<Value>,
}

impl ApiResponse {
    /// The `value` array of the body, or empty.
    pub fn value_list(&self) -> &[Value] {
        self.body
            .as_ref()
            .map(|b| tenaz_core::domain::document::list_of(b, "value"))
            .unwrap_or(&[])
    }

    /// The `value` integer of a `$count`-style body, or 0.
    pub fn count(&self) -> i64 {
        self.body
            .as_ref()
            .and_then(|b| b.get("value"))
            .and_then(Value::as_i64)
            .unwrap_or(0)
    }

    /// The backend's structured error message, if the body carries one.
    pub fn error_message(&self) -> Option<&str> {
        self.body
            .as_ref()?
            .get("error")?
            .get("message")?
            .as_str()
    }

    /// Convert a structured error body into a typed error.
    pub fn into_result(self) -> Result<Self> {
        if let Some(message) = self.error_message() {
            return Err(Error::remote(&self.method, &self.url, message));
        }
        Ok(self)
    }
}

/// Log a backend error with its method, URL, and the caller's location.
///
/// The `[file:line]` tag makes the failure line grep-able back to the
/// call site, matching how enumeration flows report and continue.
#[track_caller]
pub fn report_error_if_any(response: &ApiResponse) {
    if let Some(message) = response.error_message() {
        let caller = std::panic::Location::caller();
        error!(
            "{} {} [{}:{}] error: {message}",
            response.method,
            response.url,
            caller.file(),
            caller.line()
        );
    }
}
