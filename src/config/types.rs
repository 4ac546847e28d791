use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub archive: ArchiveConfig,
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub storage: StorageConfig,
}

/// Where the archive lives and which part of it is worth crawling
#[derive(Debug, Clone, Deserialize)]
pub struct ArchiveConfig {
    /// Origin that relative links are resolved against
    #[serde(rename = "base-url")]
    pub base_url: String,

    /// Path of the index page; issue links are `<index-path>?text=YYYY-MM-DD`
    #[serde(rename = "index-path", default = "default_index_path")]
    pub index_path: String,

    /// Issues published before this date carry no audio and are never visited
    #[serde(rename = "media-since")]
    pub media_since: NaiveDate,
}

/// Request pacing and caching
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Minimum time between two outbound requests (milliseconds)
    #[serde(rename = "request-delay-ms")]
    pub request_delay_ms: u64,

    /// How long the cached index page stays valid (hours)
    #[serde(rename = "index-ttl-hours", default = "default_index_ttl_hours")]
    pub index_ttl_hours: u64,

    /// Per-request timeout (seconds)
    #[serde(rename = "timeout-secs", default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl CrawlerConfig {
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.request_delay_ms)
    }

    pub fn index_ttl(&self) -> Duration {
        Duration::from_secs(self.index_ttl_hours.saturating_mul(60 * 60))
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url")]
    pub contact_url: String,
}

/// Local persistence
#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path")]
    pub database_path: String,

    /// Directory holding cached archive pages
    #[serde(rename = "cache-dir")]
    pub cache_dir: String,
}

fn default_index_path() -> String {
    "/archiv-text".to_string()
}

fn default_index_ttl_hours() -> u64 {
    24
}

fn default_timeout_secs() -> u64 {
    30
}
