//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the Storage trait.

use crate::model::{Article, ArticleId, ArticleSummary, UrlSize};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{Storage, StorageError, StorageResult};
use crate::CrawlError;
use chrono::NaiveDate;
use rusqlite::{params, Connection, OptionalExtension};
use std::collections::HashSet;
use std::path::Path;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// SQLite storage backend
///
/// Articles passed to `insert_article` are held in memory until `commit`,
/// which writes them all in one transaction. Dropping the storage without
/// committing discards them, leaving the database as it was.
pub struct SqliteStorage {
    conn: Connection,
    pending: Vec<Article>,
    pending_ids: HashSet<ArticleId>,
}

impl SqliteStorage {
    /// Creates a new SqliteStorage instance
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStorage)` - Successfully opened/created database
    /// * `Err(CrawlError)` - Failed to open database
    pub fn new(path: &Path) -> Result<Self, CrawlError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA foreign_keys = ON;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self::with_connection(conn))
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> Result<Self, CrawlError> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        initialize_schema(&conn)?;
        Ok(Self::with_connection(conn))
    }

    fn with_connection(conn: Connection) -> Self {
        Self {
            conn,
            pending: Vec::new(),
            pending_ids: HashSet::new(),
        }
    }

    fn is_stored(&self, id: ArticleId) -> StorageResult<bool> {
        let found: Option<i64> = self
            .conn
            .query_row(
                "SELECT mediasyncid FROM article WHERE mediasyncid = ?1",
                params![id.0],
                |row| row.get(0),
            )
            .optional()?;
        Ok(found.is_some())
    }

    fn load_authors(&self, id: ArticleId) -> StorageResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT author.name FROM article_author
             JOIN author ON author.id = article_author.author_id
             WHERE article_author.mediasyncid = ?1
             ORDER BY article_author.position",
        )?;
        let authors = stmt
            .query_map(params![id.0], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(authors)
    }

    fn load_medias(&self, id: ArticleId) -> StorageResult<Vec<UrlSize>> {
        let mut stmt = self
            .conn
            .prepare("SELECT url, size FROM audiofile WHERE mediasyncid = ?1 ORDER BY id")?;
        let medias = stmt
            .query_map(params![id.0], |row| {
                Ok(UrlSize {
                    url: row.get(0)?,
                    size: row.get::<_, i64>(1)? as u64,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(medias)
    }
}

fn parse_date(value: String) -> StorageResult<NaiveDate> {
    NaiveDate::parse_from_str(&value, DATE_FORMAT)
        .map_err(|_| StorageError::MalformedValue { column: "date", value })
}

fn to_sql_size(size: u64) -> StorageResult<i64> {
    i64::try_from(size)
        .map_err(|_| StorageError::ConstraintViolation(format!("size {} out of range", size)))
}

/// Returns the author id for `name`, inserting the author on first sight
fn insert_or_get_author(conn: &Connection, name: &str) -> StorageResult<i64> {
    let existing: Option<i64> = conn
        .query_row(
            "SELECT id FROM author WHERE name = ?1 LIMIT 1",
            params![name],
            |row| row.get(0),
        )
        .optional()?;

    if let Some(id) = existing {
        return Ok(id);
    }

    conn.execute("INSERT INTO author (name) VALUES (?1)", params![name])?;
    Ok(conn.last_insert_rowid())
}

/// Writes an article with its authors and media rows
fn write_article(conn: &Connection, article: &Article) -> StorageResult<()> {
    let summary = &article.summary;
    conn.execute(
        "INSERT INTO article (mediasyncid, url, title, date, summary, image_url)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            summary.id.0,
            summary.url,
            summary.title,
            summary.date.format(DATE_FORMAT).to_string(),
            summary.summary,
            article.image_url,
        ],
    )?;

    for (position, name) in summary.authors.iter().enumerate() {
        let author_id = insert_or_get_author(conn, name)?;
        conn.execute(
            "INSERT INTO article_author (mediasyncid, author_id, position) VALUES (?1, ?2, ?3)",
            params![summary.id.0, author_id, position as i64],
        )?;
    }

    for media in &article.medias {
        conn.execute(
            "INSERT INTO audiofile (mediasyncid, url, size) VALUES (?1, ?2, ?3)",
            params![summary.id.0, media.url, to_sql_size(media.size)?],
        )?;
    }

    Ok(())
}

impl Storage for SqliteStorage {
    // ===== Cursor =====

    fn max_stored_date(&self) -> StorageResult<Option<NaiveDate>> {
        let max: Option<String> =
            self.conn
                .query_row("SELECT max(date) FROM article", [], |row| row.get(0))?;
        max.map(parse_date).transpose()
    }

    // ===== Articles =====

    fn insert_article(&mut self, article: &Article) -> StorageResult<()> {
        let id = article.summary.id;
        if self.pending_ids.contains(&id) || self.is_stored(id)? {
            return Err(StorageError::DuplicateArticle(id));
        }

        self.pending_ids.insert(id);
        self.pending.push(article.clone());
        Ok(())
    }

    fn commit(&mut self) -> StorageResult<()> {
        if self.pending.is_empty() {
            return Ok(());
        }

        let tx = self.conn.transaction()?;
        for article in &self.pending {
            write_article(&tx, article)?;
        }
        tx.commit()?;

        tracing::debug!("Committed {} articles", self.pending.len());
        self.pending.clear();
        self.pending_ids.clear();
        Ok(())
    }

    fn rollback(&mut self) {
        if !self.pending.is_empty() {
            tracing::debug!("Discarding {} uncommitted articles", self.pending.len());
        }
        self.pending.clear();
        self.pending_ids.clear();
    }

    fn pending_count(&self) -> usize {
        self.pending.len()
    }

    fn all_articles(&self) -> StorageResult<Vec<Article>> {
        let mut stmt = self.conn.prepare(
            "SELECT mediasyncid, url, title, date, summary, image_url
             FROM article ORDER BY date DESC, mediasyncid DESC",
        )?;

        let rows = stmt
            .query_map([], |row| {
                Ok((
                    ArticleId(row.get(0)?),
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, Option<String>>(5)?,
                ))
            })?
            .collect::<Result<Vec<_>, _>>()?;

        let mut articles = Vec::with_capacity(rows.len());
        for (id, url, title, date, summary, image_url) in rows {
            articles.push(Article {
                summary: ArticleSummary {
                    id,
                    url,
                    title,
                    date: parse_date(date)?,
                    summary,
                    authors: self.load_authors(id)?,
                },
                image_url,
                medias: self.load_medias(id)?,
            });
        }

        Ok(articles)
    }

    // ===== Size Cache =====

    fn get_size(&self, url: &str) -> StorageResult<Option<u64>> {
        let size: Option<i64> = self
            .conn
            .query_row(
                "SELECT size FROM sizecache WHERE url = ?1 LIMIT 1",
                params![url],
                |row| row.get(0),
            )
            .optional()?;
        Ok(size.map(|size| size as u64))
    }

    fn put_size(&mut self, url: &str, size: u64) -> StorageResult<()> {
        self.conn.execute(
            "INSERT INTO sizecache (url, size) VALUES (?1, ?2)",
            params![url, to_sql_size(size)?],
        )?;
        Ok(())
    }

    // ===== Statistics =====

    fn count_articles(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM article", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn count_authors(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM author", [], |row| row.get(0))?;
        Ok(count as u64)
    }

    fn media_totals(&self) -> StorageResult<(u64, u64)> {
        let (count, bytes): (i64, i64) = self.conn.query_row(
            "SELECT COUNT(*), COALESCE(SUM(size), 0) FROM audiofile",
            [],
            |row| Ok((row.get(0)?, row.get(1)?)),
        )?;
        Ok((count as u64, bytes as u64))
    }

    fn count_cached_sizes(&self) -> StorageResult<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM sizecache", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}
