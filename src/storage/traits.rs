//! Storage traits and error types
//!
//! This module defines the trait interface for storage backends and
//! associated error types.

use crate::model::{Article, ArticleId};
use chrono::NaiveDate;
use thiserror::Error;

/// Errors that can occur during storage operations
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    #[error("Article {0} is already stored")]
    DuplicateArticle(ArticleId),

    #[error("Malformed value in column {column}: '{value}'")]
    MalformedValue { column: &'static str, value: String },
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for storage backend implementations
///
/// Article writes are deferred: `insert_article` validates and queues a
/// record, and nothing becomes visible to readers until `commit`. Size cache
/// entries are durable as soon as `put_size` returns.
pub trait Storage {
    // ===== Cursor =====

    /// Date of the most recent committed article, `None` for an empty store
    fn max_stored_date(&self) -> StorageResult<Option<NaiveDate>>;

    // ===== Articles =====

    /// Queues an article with its authors and media for the next commit
    ///
    /// Fails with [`StorageError::DuplicateArticle`] if the id is already
    /// stored or already queued.
    fn insert_article(&mut self, article: &Article) -> StorageResult<()>;

    /// Writes all queued articles in a single transaction
    fn commit(&mut self) -> StorageResult<()>;

    /// Drops all queued articles without writing them
    fn rollback(&mut self);

    /// Number of articles queued but not yet committed
    fn pending_count(&self) -> usize;

    /// All committed articles, newest first, with authors and media
    fn all_articles(&self) -> StorageResult<Vec<Article>>;

    // ===== Size Cache =====

    /// Cached size for `url`, `None` on a miss
    fn get_size(&self, url: &str) -> StorageResult<Option<u64>>;

    /// Records the size of `url`
    fn put_size(&mut self, url: &str, size: u64) -> StorageResult<()>;

    // ===== Statistics =====

    /// Number of committed articles
    fn count_articles(&self) -> StorageResult<u64>;

    /// Number of distinct authors
    fn count_authors(&self) -> StorageResult<u64>;

    /// Number of media rows and their total size in bytes
    fn media_totals(&self) -> StorageResult<(u64, u64)>;

    /// Number of size cache entries
    fn count_cached_sizes(&self) -> StorageResult<u64>;
}
