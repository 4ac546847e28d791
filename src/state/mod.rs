//! State module for tracking crawl progress
//!
//! # Components
//!
//! - `CrawlPhase`: where the incremental crawl driver is within a run

mod crawl_phase;

pub use crawl_phase::CrawlPhase;
