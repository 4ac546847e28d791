//! Statistics generation from the article database
//!
//! This module provides functionality for extracting and displaying
//! storage statistics.

use crate::storage::Storage;
use crate::CrawlError;
use chrono::NaiveDate;

/// Storage statistics summary
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrawlStatistics {
    /// Number of stored articles
    pub articles: u64,

    /// Number of distinct authors
    pub authors: u64,

    /// Number of stored media files
    pub medias: u64,

    /// Combined size of all media files in bytes
    pub media_bytes: u64,

    /// Number of URLs in the size cache
    pub cached_sizes: u64,

    /// Date of the newest stored article
    pub cursor: Option<NaiveDate>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `storage` - The storage backend to query
///
/// # Returns
///
/// * `Ok(CrawlStatistics)` - Successfully loaded statistics
/// * `Err(CrawlError)` - Failed to query statistics
pub fn load_statistics(storage: &dyn Storage) -> Result<CrawlStatistics, CrawlError> {
    let (medias, media_bytes) = storage.media_totals()?;

    Ok(CrawlStatistics {
        articles: storage.count_articles()?,
        authors: storage.count_authors()?,
        medias,
        media_bytes,
        cached_sizes: storage.count_cached_sizes()?,
        cursor: storage.max_stored_date()?,
    })
}

/// Formats a byte count with a binary unit
fn human_bytes(bytes: u64) -> String {
    const UNITS: [&str; 5] = ["B", "KiB", "MiB", "GiB", "TiB"];
    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Prints statistics to stdout in a formatted manner
///
/// # Arguments
///
/// * `stats` - The statistics to display
pub fn print_statistics(stats: &CrawlStatistics) {
    println!("=== Archive Statistics ===\n");

    println!("Articles: {}", stats.articles);
    println!("Authors: {}", stats.authors);
    println!(
        "Audio files: {} ({})",
        stats.medias,
        human_bytes(stats.media_bytes)
    );
    println!("Cached sizes: {}", stats.cached_sizes);

    match stats.cursor {
        Some(date) => println!("Newest article: {}", date),
        None => println!("Newest article: none"),
    }
}
