//! Crawler coordinator - incremental crawl orchestration
//!
//! A run reads the cursor (date of the newest stored article), walks every
//! issue published after it in ascending date order, stores the articles
//! that carry audio, and commits once at the very end. A failed run commits
//! nothing, so the next run resumes from the same cursor.

use crate::cache::{DiskCache, ResponseCache};
use crate::config::Config;
use crate::crawler::walker::ArchiveWalker;
use crate::model::Issue;
use crate::state::CrawlPhase;
use crate::storage::{SizeCache, SqliteStorage, Storage};
use crate::CrawlError;
use chrono::NaiveDate;
use std::path::Path;

/// Returns true if an issue published on `date` still needs to be crawled
///
/// The issue must be strictly newer than the cursor and not older than
/// `media_since`, before which the archive has no audio at all.
pub fn is_new_issue(date: NaiveDate, cursor: Option<NaiveDate>, media_since: NaiveDate) -> bool {
    date >= media_since && cursor.map_or(true, |cursor| date > cursor)
}

/// Main crawler coordinator structure
pub struct Coordinator<S: Storage, C: ResponseCache> {
    walker: ArchiveWalker<C>,
    storage: S,
    media_since: NaiveDate,
    phase: CrawlPhase,
}

impl Coordinator<SqliteStorage, DiskCache> {
    /// Creates a coordinator backed by the configured database and cache directory
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - Failed to open storage or build the HTTP client
    pub fn new(config: &Config) -> Result<Self, CrawlError> {
        let storage = SqliteStorage::new(Path::new(&config.storage.database_path))?;
        let walker = ArchiveWalker::from_config(config, DiskCache::new(&config.storage.cache_dir))?;
        Ok(Self::with_parts(walker, storage, config.archive.media_since))
    }
}

impl<S: Storage, C: ResponseCache> Coordinator<S, C> {
    /// Creates a coordinator from explicit parts
    pub fn with_parts(walker: ArchiveWalker<C>, storage: S, media_since: NaiveDate) -> Self {
        Self {
            walker,
            storage,
            media_since,
            phase: CrawlPhase::Idle,
        }
    }

    pub fn phase(&self) -> CrawlPhase {
        self.phase
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    fn transition(&mut self, next: CrawlPhase) -> Result<(), CrawlError> {
        if !self.phase.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: self.phase,
                to: next,
            });
        }
        tracing::debug!("Crawl phase: {} -> {}", self.phase, next);
        self.phase = next;
        Ok(())
    }

    /// Runs one incremental crawl
    ///
    /// # Returns
    ///
    /// The number of newly stored articles. Zero means nothing new was
    /// found and downstream feed generation can be skipped.
    pub async fn run(&mut self) -> Result<usize, CrawlError> {
        let result = self.run_inner().await;
        if result.is_err() {
            self.storage.rollback();
            self.phase = CrawlPhase::Idle;
        }
        result
    }

    async fn run_inner(&mut self) -> Result<usize, CrawlError> {
        self.transition(CrawlPhase::ScanningIssues)?;

        let cursor = self.storage.max_stored_date()?;
        match cursor {
            Some(date) => tracing::info!("Newest stored article is from {}", date),
            None => tracing::info!("No stored articles, crawling from {}", self.media_since),
        }

        let mut issues = self.walker.list_issues().await?;
        issues.sort_by_key(|issue| issue.date);
        // The index may link one issue more than once
        issues.dedup_by_key(|issue| issue.date);

        let media_since = self.media_since;
        let new_issues: Vec<Issue> = issues
            .into_iter()
            .filter(|issue| is_new_issue(issue.date, cursor, media_since))
            .collect();

        let mut new_articles = 0;
        for issue in &new_issues {
            tracing::info!("Found new issue {}", issue.date);
            self.transition(CrawlPhase::ScanningArticles)?;
            new_articles += self.scan_issue(issue).await?;
            self.transition(CrawlPhase::ScanningIssues)?;
        }

        self.storage.commit()?;
        self.transition(CrawlPhase::Idle)?;

        tracing::info!(
            "Crawl finished: {} new articles from {} issues",
            new_articles,
            new_issues.len()
        );
        Ok(new_articles)
    }

    /// Builds and queues every article of `issue` that carries audio
    async fn scan_issue(&mut self, issue: &Issue) -> Result<usize, CrawlError> {
        let summaries = self.walker.list_article_summaries(issue).await?;

        let mut stored = 0;
        for summary in summaries {
            let id = summary.id;
            let article = self
                .walker
                .build_article(summary, &mut SizeCache::new(&mut self.storage))
                .await?;

            if !article.has_media() {
                tracing::debug!("Skipping article {} without audio", id);
                continue;
            }

            self.storage.insert_article(&article)?;
            tracing::info!("Stored article {}: {}", id, article.summary.title);
            stored += 1;
        }

        Ok(stored)
    }
}

/// Runs a complete crawl with the configured storage and cache
///
/// # Returns
///
/// * `Ok(usize)` - Number of newly stored articles
/// * `Err(CrawlError)` - The run failed and nothing was committed
pub async fn run_crawl(config: Config) -> Result<usize, CrawlError> {
    let mut coordinator = Coordinator::new(&config)?;
    coordinator.run().await
}
