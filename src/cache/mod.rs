//! Response cache for fetched archive pages
//!
//! Pages are cached under logical keys (`CacheKey`) made of a kind and an
//! identifier. The fetcher consults the cache before going to the network and
//! stores every successful response body. Two backends are provided:
//!
//! - `DiskCache`: one file per key below a cache directory
//! - `MemoryCache`: an in-process map, used in tests

mod disk;
mod memory;

pub use disk::DiskCache;
pub use memory::MemoryCache;

use chrono::NaiveDate;
use std::time::Duration;
use thiserror::Error;

use crate::model::ArticleId;

/// Errors raised by cache backends
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("IO error on cache entry {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },
}

/// Result type for cache operations
pub type CacheResult<T> = Result<T, CacheError>;

/// What a cached page is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CacheKind {
    /// The archive index listing all issues
    Index,
    /// One issue page, identified by its date
    Issue,
    /// One article page, identified by its article id
    Article,
}

/// Logical cache key: a kind plus an identifier within that kind
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub kind: CacheKind,
    pub id: String,
}

impl CacheKey {
    /// Key of the archive index
    pub fn index() -> Self {
        Self {
            kind: CacheKind::Index,
            id: String::new(),
        }
    }

    /// Key of the issue published on `date`
    pub fn issue(date: NaiveDate) -> Self {
        Self {
            kind: CacheKind::Issue,
            id: date.format("%Y-%m-%d").to_string(),
        }
    }

    /// Key of the article with the given id
    pub fn article(id: ArticleId) -> Self {
        Self {
            kind: CacheKind::Article,
            id: id.to_string(),
        }
    }
}

/// Storage for response bodies keyed by `CacheKey`
pub trait ResponseCache {
    /// Returns the cached body for `key`
    ///
    /// With a `ttl`, entries whose age is not below it count as missing.
    /// Without one, any stored entry is returned.
    fn lookup(&self, key: &CacheKey, ttl: Option<Duration>) -> CacheResult<Option<String>>;

    /// Stores `body` under `key`, replacing any previous entry
    fn store(&mut self, key: &CacheKey, body: &str) -> CacheResult<()>;
}

/// Returns true if an entry of the given age is still usable
pub(crate) fn is_fresh(age: Duration, ttl: Option<Duration>) -> bool {
    ttl.map_or(true, |ttl| age < ttl)
}
