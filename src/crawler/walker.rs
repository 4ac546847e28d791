//! Walks the archive: index → issue → article
//!
//! The index page is cached with a TTL because new issues appear on it.
//! Issue and article pages never change once published and are cached
//! without expiry.

use crate::cache::{CacheKey, ResponseCache};
use crate::config::Config;
use crate::crawler::fetcher::ResourceFetcher;
use crate::crawler::parser::{parse_article, parse_issue, parse_issue_index, ArticlePage};
use crate::model::{Article, ArticleSummary, Issue, UrlSize};
use crate::storage::{SizeCache, Storage};
use crate::CrawlError;
use std::time::Duration;

/// Reads the archive through a cached, rate-limited fetcher
pub struct ArchiveWalker<C: ResponseCache> {
    fetcher: ResourceFetcher<C>,
    index_path: String,
    index_ttl: Duration,
}

impl<C: ResponseCache> ArchiveWalker<C> {
    pub fn new(fetcher: ResourceFetcher<C>, index_path: impl Into<String>, index_ttl: Duration) -> Self {
        Self {
            fetcher,
            index_path: index_path.into(),
            index_ttl,
        }
    }

    /// Creates a walker from the crawler configuration
    pub fn from_config(config: &Config, cache: C) -> Result<Self, CrawlError> {
        let fetcher = ResourceFetcher::from_config(config, cache)?;
        Ok(Self::new(
            fetcher,
            config.archive.index_path.clone(),
            config.crawler.index_ttl(),
        ))
    }

    /// Lists all issues linked from the index, in page order
    pub async fn list_issues(&mut self) -> Result<Vec<Issue>, CrawlError> {
        let index_path = self.index_path.clone();
        let html = self
            .fetcher
            .fetch(&index_path, &CacheKey::index(), Some(self.index_ttl))
            .await?;
        parse_issue_index(&html, &index_path, &index_path)
    }

    /// Lists the articles of one issue, in page order
    pub async fn list_article_summaries(
        &mut self,
        issue: &Issue,
    ) -> Result<Vec<ArticleSummary>, CrawlError> {
        let html = self
            .fetcher
            .fetch(&issue.url, &CacheKey::issue(issue.date), None)
            .await?;
        parse_issue(&html, &issue.url, issue.date)
    }

    /// Loads an article page and extracts its headline, image and media links
    pub async fn load_article(&mut self, summary: &ArticleSummary) -> Result<ArticlePage, CrawlError> {
        let html = self
            .fetcher
            .fetch(&summary.url, &CacheKey::article(summary.id), None)
            .await?;
        parse_article(&html, &summary.url)
    }

    /// Builds the complete article for `summary`
    ///
    /// The article page's headline fills in a blank listing title. Image and
    /// media links are resolved against the archive origin, and every media
    /// size comes from `sizes`, probing on a miss. Any failed probe fails the
    /// whole article.
    pub async fn build_article<S: Storage + ?Sized>(
        &mut self,
        summary: ArticleSummary,
        sizes: &mut SizeCache<'_, S>,
    ) -> Result<Article, CrawlError> {
        let page = self.load_article(&summary).await?;
        let summary = summary.with_title(page.title.as_deref());

        let image_url = page
            .image_url
            .map(|src| self.fetcher.make_absolute(&src).map(String::from))
            .transpose()?;

        let mut medias = Vec::with_capacity(page.media_urls.len());
        for src in &page.media_urls {
            let url = self.fetcher.make_absolute(src)?.to_string();
            let fetcher = &mut self.fetcher;
            let size = sizes
                .get_or_probe(&url, move |url| async move { fetcher.probe_size(&url).await })
                .await?;
            medias.push(UrlSize { url, size });
        }

        Ok(Article {
            summary,
            image_url,
            medias,
        })
    }
}
