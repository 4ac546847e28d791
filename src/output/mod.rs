//! Output module for reporting on stored crawl results
//!
//! Feed generation reads articles through `Storage::all_articles`; this module
//! only summarizes the store for the command line.

pub mod stats;

pub use stats::{load_statistics, print_statistics, CrawlStatistics};
