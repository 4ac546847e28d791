/// Phase definitions for the incremental crawl driver
use std::fmt;

/// Represents where a crawl run currently is
///
/// A run moves `Idle → ScanningIssues → ScanningArticles ⇄ ScanningIssues → Idle`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CrawlPhase {
    /// No run in progress
    Idle,

    /// Reading the archive index and choosing issues past the cursor
    ScanningIssues,

    /// Building and storing the articles of one issue
    ScanningArticles,
}

impl CrawlPhase {
    /// Returns true if a run is in progress
    pub fn is_active(&self) -> bool {
        !matches!(self, Self::Idle)
    }

    /// Checks if a transition to `next` is allowed
    pub fn can_transition_to(&self, next: CrawlPhase) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::ScanningIssues)
                | (Self::ScanningIssues, Self::ScanningArticles)
                | (Self::ScanningArticles, Self::ScanningIssues)
                | (Self::ScanningIssues, Self::Idle)
        )
    }
}

impl fmt::Display for CrawlPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Idle => "idle",
            Self::ScanningIssues => "scanning issues",
            Self::ScanningArticles => "scanning articles",
        };
        write!(f, "{}", name)
    }
}
