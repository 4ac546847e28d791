//! Storage module for persisting crawl results
//!
//! This module handles all database operations for the crawler, including:
//! - SQLite database initialization and schema management
//! - Article, author and media persistence with deferred commit
//! - The persistent media size cache
//! - Ordered read-back of all articles for feed generation

mod schema;
mod size_cache;
mod sqlite;
mod traits;

pub use size_cache::SizeCache;
pub use sqlite::SqliteStorage;
pub use traits::{Storage, StorageError, StorageResult};
