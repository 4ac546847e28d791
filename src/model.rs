//! Record types produced by the archive walker and persisted by storage

use chrono::NaiveDate;
use std::fmt;

/// Stable identifier the archive assigns to an article (`mediasyncid`)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ArticleId(pub i64);

impl fmt::Display for ArticleId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One issue linked from the archive index
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Issue {
    /// Publication date of the issue
    pub date: NaiveDate,

    /// Link to the issue page, as found in the index (possibly relative)
    pub url: String,
}

/// Article metadata found while listing an issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleSummary {
    pub id: ArticleId,
    pub url: String,
    /// May be empty on the issue page; see [`ArticleSummary::with_title`]
    pub title: String,
    pub date: NaiveDate,
    pub summary: String,
    pub authors: Vec<String>,
}

impl ArticleSummary {
    /// Returns a copy carrying `title` if this summary's own title is blank
    ///
    /// A non-blank issue-page title always wins over the article page.
    pub fn with_title(self, title: Option<&str>) -> Self {
        match title {
            Some(title) if self.title.trim().is_empty() => Self {
                title: title.to_string(),
                ..self
            },
            _ => self,
        }
    }
}

/// A media resource and its size in bytes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlSize {
    pub url: String,
    pub size: u64,
}

/// A fully resolved article ready to be persisted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    pub summary: ArticleSummary,
    pub image_url: Option<String>,
    pub medias: Vec<UrlSize>,
}

impl Article {
    /// Articles without media are never persisted
    pub fn has_media(&self) -> bool {
        !self.medias.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn summary(title: &str) -> ArticleSummary {
        ArticleSummary {
            id: ArticleId(1),
            url: "/artikel/!1".to_string(),
            title: title.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(),
            summary: String::new(),
            authors: vec![],
        }
    }

    #[test]
    fn test_with_title_backfills_blank() {
        let filled = summary("  ").with_title(Some("From article page"));
        assert_eq!(filled.title, "From article page");
    }

    #[test]
    fn test_with_title_keeps_existing() {
        let kept = summary("Issue title").with_title(Some("From article page"));
        assert_eq!(kept.title, "Issue title");
    }

    #[test]
    fn test_with_title_none_is_noop() {
        assert_eq!(summary("").with_title(None).title, "");
    }
}
