//! Downloader contract and the default HTTP implementation
//!
//! The engine only sees the `Downloader` trait. `HttpDownloader` handles:
//! - Building HTTP clients with proper user agent strings
//! - Per-item headers and proxies
//! - Error classification into `FetchError`

use crate::config::{EngineConfig, UserAgentConfig};
use crate::item::{FetchResult, WorkItem};
use crate::{FetchError, FetchOutcome};
use async_trait::async_trait;
use reqwest::{Client, Proxy};
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use url::Url;

/// Fetches the content behind a work item
///
/// Implementations are called concurrently from many worker tasks. Any
/// transport-level retry is their own business; a returned error is handed to
/// the engine's retry policy.
#[async_trait]
pub trait Downloader: Send + Sync {
    async fn fetch(&self, item: &WorkItem, config: &EngineConfig) -> FetchOutcome;
}

/// Builds an HTTP client with proper configuration
///
/// # Example
///
/// ```no_run
/// use skein::config::UserAgentConfig;
/// use skein::crawler::build_http_client;
///
/// let config = UserAgentConfig {
///     crawler_name: "Skein".to_string(),
///     crawler_version: "1.0".to_string(),
///     contact_url: "https://example.com/about".to_string(),
///     contact_email: "admin@example.com".to_string(),
/// };
///
/// let client = build_http_client(&config, None).unwrap();
/// ```
pub fn build_http_client(
    config: &UserAgentConfig,
    proxy: Option<&str>,
) -> Result<Client, reqwest::Error> {
    let mut builder = Client::builder()
        .user_agent(config.header_value())
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true);

    if let Some(proxy) = proxy {
        builder = builder.proxy(Proxy::all(proxy)?);
    }

    builder.build()
}

/// Downloader backed by a shared reqwest client
///
/// Items routed through a proxy use one client per proxy URL, built on first
/// use and reused afterwards.
#[derive(Debug, Clone)]
pub struct HttpDownloader {
    client: Client,
    user_agent: UserAgentConfig,
    proxied: Arc<Mutex<HashMap<String, Client>>>,
}

impl HttpDownloader {
    pub fn new(user_agent: UserAgentConfig) -> Result<Self, reqwest::Error> {
        let client = build_http_client(&user_agent, None)?;
        Ok(Self {
            client,
            user_agent,
            proxied: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Number of distinct proxy clients built so far
    pub fn proxy_client_count(&self) -> usize {
        self.proxied
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    fn client_for(&self, item: &WorkItem) -> Result<Client, FetchError> {
        let Some(proxy) = &item.proxy_url else {
            return Ok(self.client.clone());
        };

        let mut proxied = self
            .proxied
            .lock()
            .unwrap_or_else(PoisonError::into_inner);
        if let Some(client) = proxied.get(proxy) {
            return Ok(client.clone());
        }

        let client =
            build_http_client(&self.user_agent, Some(proxy)).map_err(|source| FetchError::Http {
                url: item.target().to_string(),
                source,
            })?;
        tracing::debug!("Built HTTP client for proxy {}", proxy);
        proxied.insert(proxy.clone(), client.clone());
        Ok(client)
    }
}

#[async_trait]
impl Downloader for HttpDownloader {
    async fn fetch(&self, item: &WorkItem, config: &EngineConfig) -> FetchOutcome {
        let target = item.target();
        let url = Url::parse(target).map_err(|e| FetchError::InvalidTarget {
            url: target.to_string(),
            message: e.to_string(),
        })?;

        let client = self.client_for(item)?;
        let mut request = client.get(url);
        for (name, value) in &item.headers {
            request = request.header(name.as_str(), value.as_str());
        }
        if let Some(timeout) = config.fetch_timeout() {
            request = request.timeout(timeout);
        }

        let response = request
            .send()
            .await
            .map_err(|e| classify_error(target, e, config))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                url: target.to_string(),
                status: status.as_u16(),
            });
        }

        let final_url = response.url().to_string();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let body = response
            .text()
            .await
            .map_err(|e| classify_error(target, e, config))?;

        tracing::trace!("Fetched {} ({} bytes)", final_url, body.len());

        Ok(FetchResult {
            request: item.clone(),
            final_url,
            status_code: status.as_u16(),
            content_type,
            body,
        })
    }
}

fn classify_error(url: &str, error: reqwest::Error, config: &EngineConfig) -> FetchError {
    if error.is_timeout() {
        FetchError::Timeout {
            url: url.to_string(),
            after: config.fetch_timeout().unwrap_or_default(),
        }
    } else {
        FetchError::Http {
            url: url.to_string(),
            source: error,
        }
    }
}
