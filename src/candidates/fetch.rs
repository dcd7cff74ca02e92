use std::{collections::HashMap, time::Duration};

use anyhow::Context as _;

use crate::foundation::error::{QuoteframeError, QuoteframeResult};

/// Downloads the encoded bytes of a candidate image.
///
/// Implementations must bound every request in time; a hung fetch may not stall the batch.
pub trait ImageFetcher: Send + Sync {
    /// Fetch the raw bytes behind `url`.
    fn fetch(&self, url: &str) -> QuoteframeResult<Vec<u8>>;
}

/// Blocking HTTP fetcher with a per-request timeout and an explicit client identifier.
#[derive(Clone, Debug)]
pub struct HttpFetcher {
    client: reqwest::blocking::Client,
    max_bytes: u64,
}

impl HttpFetcher {
    /// Build a fetcher. `timeout` covers connect, headers and body.
    pub fn new(timeout: Duration, user_agent: &str, max_bytes: u64) -> QuoteframeResult<Self> {
        if timeout.is_zero() {
            return Err(QuoteframeError::validation("fetch timeout must be > 0"));
        }
        if user_agent.trim().is_empty() {
            return Err(QuoteframeError::validation("user agent must be non-empty"));
        }
        let client = reqwest::blocking::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .connect_timeout(timeout)
            .redirect(reqwest::redirect::Policy::limited(10))
            .build()
            .context("build http client")?;
        Ok(Self { client, max_bytes })
    }

    /// Build a fetcher from the filter configuration.
    pub fn from_config(cfg: &crate::candidates::filter::FilterConfig) -> QuoteframeResult<Self> {
        Self::new(
            Duration::from_millis(cfg.fetch_timeout_ms),
            &cfg.user_agent,
            cfg.max_download_bytes,
        )
    }
}

impl ImageFetcher for HttpFetcher {
    fn fetch(&self, url: &str) -> QuoteframeResult<Vec<u8>> {
        let parsed = reqwest::Url::parse(url)
            .map_err(|e| QuoteframeError::fetch(format!("invalid url '{url}': {e}")))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(QuoteframeError::fetch(format!(
                "unsupported url scheme '{}'",
                parsed.scheme()
            )));
        }

        let resp = self
            .client
            .get(parsed)
            .send()
            .map_err(|e| QuoteframeError::fetch(format!("GET {url}: {e}")))?;
        let status = resp.status();
        if !status.is_success() {
            return Err(QuoteframeError::fetch(format!("GET {url}: HTTP {status}")));
        }
        if let Some(len) = resp.content_length()
            && len > self.max_bytes
        {
            return Err(QuoteframeError::fetch(format!(
                "GET {url}: body of {len} bytes exceeds limit of {}",
                self.max_bytes
            )));
        }

        let body = resp
            .bytes()
            .map_err(|e| QuoteframeError::fetch(format!("GET {url}: read body: {e}")))?;
        if body.len() as u64 > self.max_bytes {
            return Err(QuoteframeError::fetch(format!(
                "GET {url}: body exceeds limit of {} bytes",
                self.max_bytes
            )));
        }
        Ok(body.to_vec())
    }
}

/// In-memory fetcher keyed by URL. Unknown URLs fail like an unreachable host.
#[derive(Clone, Debug, Default)]
pub struct StaticFetcher {
    payloads: HashMap<String, Vec<u8>>,
}

impl StaticFetcher {
    /// Empty fetcher.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under `url`, replacing any previous payload.
    pub fn insert(&mut self, url: impl Into<String>, bytes: Vec<u8>) {
        self.payloads.insert(url.into(), bytes);
    }

    /// Builder-style [`StaticFetcher::insert`].
    pub fn with(mut self, url: impl Into<String>, bytes: Vec<u8>) -> Self {
        self.insert(url, bytes);
        self
    }
}

impl ImageFetcher for StaticFetcher {
    fn fetch(&self, url: &str) -> QuoteframeResult<Vec<u8>> {
        self.payloads
            .get(url)
            .cloned()
            .ok_or_else(|| QuoteframeError::fetch(format!("no payload for '{url}'")))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/candidates/fetch.rs"]
mod tests;
