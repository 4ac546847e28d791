//! HTTP fetcher implementation
//!
//! This module handles all HTTP requests for the crawler, including:
//! - Building HTTP clients with proper user agent strings
//! - Resolving archive-relative links against the archive origin
//! - Cached GET requests for archive pages
//! - HEAD requests to learn media sizes
//!
//! Every request waits on the fetcher's rate limiter first. Failures are not
//! retried; the next scheduled run starts over from the stored cursor.

use crate::cache::{CacheKey, ResponseCache};
use crate::config::{Config, UserAgentConfig};
use crate::crawler::rate_limit::RateLimiter;
use crate::CrawlError;
use reqwest::header::CONTENT_LENGTH;
use reqwest::{Client, StatusCode};
use std::time::Duration;
use url::Url;

/// Builds an HTTP client with proper configuration
///
/// # Arguments
///
/// * `config` - The user agent configuration
/// * `timeout` - Per-request timeout
///
/// # Returns
///
/// * `Ok(Client)` - Successfully built HTTP client
/// * `Err(reqwest::Error)` - Failed to build client
pub fn build_http_client(
    config: &UserAgentConfig,
    timeout: Duration,
) -> Result<Client, reqwest::Error> {
    // Format: CrawlerName/Version (+ContactURL)
    let user_agent = format!(
        "{}/{} (+{})",
        config.crawler_name, config.crawler_version, config.contact_url
    );

    Client::builder()
        .user_agent(user_agent)
        .timeout(timeout)
        .connect_timeout(Duration::from_secs(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Rate-limited, cached access to the archive
pub struct ResourceFetcher<C: ResponseCache> {
    client: Client,
    base_url: Url,
    limiter: RateLimiter,
    cache: C,
}

impl<C: ResponseCache> ResourceFetcher<C> {
    /// Creates a fetcher resolving relative links against `base_url`
    pub fn new(client: Client, base_url: Url, delay: Duration, cache: C) -> Self {
        Self {
            client,
            base_url,
            limiter: RateLimiter::new(delay),
            cache,
        }
    }

    /// Creates a fetcher from the crawler configuration
    pub fn from_config(config: &Config, cache: C) -> Result<Self, CrawlError> {
        let client = build_http_client(&config.user_agent, config.crawler.timeout())?;
        let base_url = Url::parse(&config.archive.base_url)?;
        Ok(Self::new(
            client,
            base_url,
            config.crawler.request_delay(),
            cache,
        ))
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    /// Resolves a possibly relative link against the archive origin
    pub fn make_absolute(&self, url: &str) -> Result<Url, CrawlError> {
        Ok(self.base_url.join(url)?)
    }

    /// Returns the body of `url`, from the cache when possible
    ///
    /// A cached entry under `key` is used if there is no `ttl` or if it is
    /// younger than `ttl`. Otherwise the page is downloaded, which must
    /// succeed with a 2xx status, and the body replaces the cache entry.
    pub async fn fetch(
        &mut self,
        url: &str,
        key: &CacheKey,
        ttl: Option<Duration>,
    ) -> Result<String, CrawlError> {
        if let Some(body) = self.cache.lookup(key, ttl)? {
            tracing::debug!("Cache hit for {:?} {}", key.kind, key.id);
            return Ok(body);
        }

        let url = self.make_absolute(url)?;
        self.limiter.wait().await;
        tracing::info!("GET {}", url);
        let result = self.get_body(&url).await;
        self.limiter.finish();
        let body = result?;

        self.cache.store(key, &body)?;
        Ok(body)
    }

    /// Sends a HEAD request and returns the declared `Content-Length`
    ///
    /// Not cached here; see [`crate::storage::SizeCache`].
    pub async fn probe_size(&mut self, url: &str) -> Result<u64, CrawlError> {
        let url = self.make_absolute(url)?;
        self.limiter.wait().await;
        tracing::info!("HEAD {}", url);
        let result = self.head_length(&url).await;
        self.limiter.finish();
        result
    }

    async fn get_body(&self, url: &Url) -> Result<String, CrawlError> {
        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;
        check_status(url, response.status())?;

        response.text().await.map_err(|source| CrawlError::Http {
            url: url.to_string(),
            source,
        })
    }

    async fn head_length(&self, url: &Url) -> Result<u64, CrawlError> {
        let response = self
            .client
            .head(url.clone())
            .send()
            .await
            .map_err(|source| CrawlError::Http {
                url: url.to_string(),
                source,
            })?;
        check_status(url, response.status())?;

        let value = response
            .headers()
            .get(CONTENT_LENGTH)
            .ok_or_else(|| CrawlError::MissingContentLength {
                url: url.to_string(),
            })?;

        value
            .to_str()
            .ok()
            .and_then(|v| v.trim().parse::<u64>().ok())
            .ok_or_else(|| CrawlError::InvalidContentLength {
                url: url.to_string(),
                value: String::from_utf8_lossy(value.as_bytes()).into_owned(),
            })
    }
}

fn check_status(url: &Url, status: StatusCode) -> Result<(), CrawlError> {
    if status.is_success() {
        Ok(())
    } else {
        Err(CrawlError::HttpStatus {
            url: url.to_string(),
            status: status.as_u16(),
        })
    }
}
