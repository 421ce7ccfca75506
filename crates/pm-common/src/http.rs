use std::time::Duration;

use serde::de::DeserializeOwned;
use tracing::{debug, warn};

use crate::error::CommonError;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";

#[derive(Clone, Debug)]
pub struct StandardsApiConfig {
    pub base_url: String,
    pub timeout: Duration,
    pub max_error_body_bytes: usize,
}

impl StandardsApiConfig {
    /// Optional:
    /// - `STANDARDS_API_URL` (default: "http://localhost:5000/api")
    /// - `STANDARDS_API_TIMEOUT_SECS` (default: 30)
    /// - `STANDARDS_API_MAX_ERROR_BODY_BYTES` (default: 8192)
    pub fn from_env() -> Self {
        let base_url =
            std::env::var("STANDARDS_API_URL").unwrap_or_else(|_| DEFAULT_BASE_URL.to_string());

        let timeout = std::env::var("STANDARDS_API_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse::<u64>().ok())
            .map(Duration::from_secs)
            .unwrap_or_else(|| Duration::from_secs(30));

        let max_error_body_bytes = std::env::var("STANDARDS_API_MAX_ERROR_BODY_BYTES")
            .ok()
            .and_then(|s| s.parse::<usize>().ok())
            .unwrap_or(8 * 1024);

        Self::new(base_url, timeout, max_error_body_bytes)
    }

    pub fn new(base_url: impl Into<String>, timeout: Duration, max_error_body_bytes: usize) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            timeout,
            max_error_body_bytes,
        }
    }
}

/// Read-only client for the standards REST backend.
///
/// Requests are made once: there is no retry or backoff. A failed fetch is reported to the
/// caller, which decides when to try again.
#[derive(Clone)]
pub struct StandardsApiClient {
    config: StandardsApiConfig,
    http: reqwest::Client,
}

impl StandardsApiClient {
    pub fn new(config: StandardsApiConfig) -> Result<Self, CommonError> {
        let http = reqwest::Client::builder()
            .user_agent("pm-standards/comparator")
            .build()?;
        Ok(Self { config, http })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path.trim_start_matches('/'))
    }

    /// GET `path` relative to the base URL and decode the body as JSON.
    pub async fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, CommonError> {
        let url = self.url(path);
        debug!(url = %url, "fetching");
        let resp = self
            .http
            .get(&url)
            .timeout(self.config.timeout)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = read_limited_text(resp, self.config.max_error_body_bytes).await;
            return Err(CommonError::Upstream { status, body });
        }

        let bytes = resp.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

async fn read_limited_text(resp: reqwest::Response, max_bytes: usize) -> String {
    match resp.bytes().await {
        Ok(mut b) => {
            if b.len() > max_bytes {
                b.truncate(max_bytes);
            }
            String::from_utf8_lossy(&b).to_string()
        }
        Err(e) => {
            warn!(error = %e, "failed to read backend error body");
            "<failed to read error body>".to_string()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_trailing_slash_is_trimmed() {
        let config = StandardsApiConfig::new("http://backend:5000/api/", Duration::from_secs(5), 1024);
        assert_eq!(config.base_url, "http://backend:5000/api");
    }

    #[test]
    fn url_joins_paths_with_single_slash() {
        let config = StandardsApiConfig::new("http://backend:5000/api", Duration::from_secs(5), 1024);
        let client = StandardsApiClient::new(config).unwrap();
        assert_eq!(client.url("/standards/all"), "http://backend:5000/api/standards/all");
        assert_eq!(client.url("comparisons"), "http://backend:5000/api/comparisons");
    }
}
