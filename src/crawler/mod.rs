//! Crawler module for archive fetching and processing
//!
//! This module contains the core crawling logic, including:
//! - Rate limiting of outbound requests
//! - HTTP fetching with response caching
//! - HTML extraction for index, issue and article pages
//! - Walking the archive hierarchy
//! - Overall crawl coordination

mod coordinator;
mod fetcher;
mod parser;
mod rate_limit;
mod walker;

pub use coordinator::{is_new_issue, run_crawl, Coordinator};
pub use fetcher::{build_http_client, ResourceFetcher};
pub use parser::{parse_article, parse_issue, parse_issue_index, ArticlePage};
pub use rate_limit::RateLimiter;
pub use walker::ArchiveWalker;

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete incremental crawl
///
/// This is the main entry point for a scheduled run. It will:
/// 1. Open the storage and read the cursor
/// 2. Fetch the archive index and pick issues past the cursor
/// 3. Fetch and parse each new issue and its articles
/// 4. Resolve media sizes through the size cache
/// 5. Commit all new articles at once
///
/// # Arguments
///
/// * `config` - The crawler configuration
///
/// # Returns
///
/// * `Ok(usize)` - Number of newly stored articles
/// * `Err(CrawlError)` - Crawl failed; storage is unchanged
pub async fn crawl(config: Config) -> Result<usize, CrawlError> {
    run_crawl(config).await
}
