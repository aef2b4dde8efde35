use std::time::Duration;

use reqwest::blocking::{Client, RequestBuilder};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, error};

use crate::error::{LyricFlipError, Result};

pub const DEFAULT_BASE_URL: &str = "http://localhost:3000/api";

/// Environment variable overriding the backend base URL.
pub const BASE_URL_ENV: &str = "LYRICFLIP_API_URL";

const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);

/// Per-call overrides. Everything not set here comes from the client
/// defaults (JSON headers, 15-second timeout).
#[derive(Debug, Clone, Default)]
pub struct RequestConfig {
    pub headers: Vec<(String, String)>,
    pub timeout: Option<Duration>,
}

/// Thin verb wrapper over the backend HTTP surface.
///
/// Success resolves to the decoded response body only. Failures are logged
/// with method and URL context and handed back to the caller untouched:
/// no retry, no transformation.
#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new() -> Result<Self> {
        let base_url =
            std::env::var(BASE_URL_ENV).unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());
        Self::with_base_url(base_url)
    }

    pub fn with_base_url(base_url: impl Into<String>) -> Result<Self> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .default_headers(headers)
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn get<T: DeserializeOwned>(&self, path: &str, config: Option<&RequestConfig>) -> Result<T> {
        let url = self.url(path);
        let req = self.client.get(&url);
        self.execute("GET", path, &url, req, config)
    }

    pub fn post<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        config: Option<&RequestConfig>,
    ) -> Result<T> {
        let url = self.url(path);
        let req = self.client.post(&url).json(body);
        self.execute("POST", path, &url, req, config)
    }

    pub fn put<T: DeserializeOwned, B: Serialize + ?Sized>(
        &self,
        path: &str,
        body: &B,
        config: Option<&RequestConfig>,
    ) -> Result<T> {
        let url = self.url(path);
        let req = self.client.put(&url).json(body);
        self.execute("PUT", path, &url, req, config)
    }

    pub fn delete<T: DeserializeOwned>(
        &self,
        path: &str,
        config: Option<&RequestConfig>,
    ) -> Result<T> {
        let url = self.url(path);
        let req = self.client.delete(&url);
        self.execute("DELETE", path, &url, req, config)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn execute<T: DeserializeOwned>(
        &self,
        method: &'static str,
        path: &str,
        url: &str,
        mut req: RequestBuilder,
        config: Option<&RequestConfig>,
    ) -> Result<T> {
        if let Some(config) = config {
            for (name, value) in &config.headers {
                req = req.header(name.as_str(), value.as_str());
            }
            if let Some(timeout) = config.timeout {
                req = req.timeout(timeout);
            }
        }

        debug!("{method} {url}");

        let response = match req.send() {
            Ok(response) => response,
            Err(err) => {
                error!("{method} request failed for {path}: {err}");
                return Err(err.into());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            error!("{method} {url} failed with status {status}: {body}");
            return Err(LyricFlipError::BackendStatus {
                method,
                url: url.to_string(),
                status: status.as_u16(),
                body,
            });
        }

        match response.json::<T>() {
            Ok(decoded) => Ok(decoded),
            Err(err) => {
                error!("{method} request failed for {path}: {err}");
                Err(err.into())
            }
        }
    }
}
