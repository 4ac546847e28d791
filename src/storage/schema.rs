//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the article database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One row per article, keyed by the archive's own id
CREATE TABLE IF NOT EXISTS article (
    mediasyncid INTEGER PRIMARY KEY,
    url TEXT NOT NULL,
    title TEXT NOT NULL,
    date TEXT NOT NULL,
    summary TEXT NOT NULL,
    image_url TEXT
);

CREATE INDEX IF NOT EXISTS idx_article_date ON article(date);

-- Author names, shared between articles
CREATE TABLE IF NOT EXISTS author (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    name TEXT NOT NULL UNIQUE
);

-- Ordered authorship
CREATE TABLE IF NOT EXISTS article_author (
    mediasyncid INTEGER NOT NULL REFERENCES article(mediasyncid),
    author_id INTEGER NOT NULL REFERENCES author(id),
    position INTEGER NOT NULL,
    PRIMARY KEY (mediasyncid, position)
);

-- Audio files attached to an article
CREATE TABLE IF NOT EXISTS audiofile (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    mediasyncid INTEGER NOT NULL REFERENCES article(mediasyncid),
    url TEXT NOT NULL,
    size INTEGER NOT NULL CHECK (size >= 0)
);

CREATE INDEX IF NOT EXISTS idx_audiofile_article ON audiofile(mediasyncid);

-- Sizes of media URLs seen so far
CREATE TABLE IF NOT EXISTS sizecache (
    url TEXT PRIMARY KEY,
    size INTEGER NOT NULL CHECK (size >= 0)
);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
