//! HTML extraction for the three archive page types
//!
//! - Index: links to every issue, `<index-path>?text=YYYY-MM-DD`
//! - Issue: the article listing with ids, titles, summaries and authors
//! - Article: the lead image and the audio players
//!
//! A page that lacks an element the layout promises is a markup error; the
//! caller aborts the run rather than store a partial record.

use crate::authors;
use crate::model::{ArticleId, ArticleSummary, Issue};
use crate::CrawlError;
use chrono::NaiveDate;
use scraper::{ElementRef, Html, Selector};

/// Data extracted from an article page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArticlePage {
    /// Headline of the article page, if any
    pub title: Option<String>,

    /// Source of the lead image
    pub image_url: Option<String>,

    /// Sources of the audio players, in document order
    pub media_urls: Vec<String>,
}

fn selector(css: &str, url: &str) -> Result<Selector, CrawlError> {
    Selector::parse(css).map_err(|e| markup_error(url, format!("invalid selector '{}': {:?}", css, e)))
}

fn markup_error(url: &str, message: impl Into<String>) -> CrawlError {
    CrawlError::Markup {
        url: url.to_string(),
        message: message.into(),
    }
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Extracts the issues linked from the archive index
///
/// Only links of the form `<index_path>?text=YYYY-MM-DD` count; everything
/// else in the archive section is ignored. Issues come back in page order.
///
/// # Arguments
///
/// * `html` - The index page
/// * `page_url` - URL of the page, for error messages
/// * `index_path` - Path of the index page, e.g. `/archiv-text`
pub fn parse_issue_index(
    html: &str,
    page_url: &str,
    index_path: &str,
) -> Result<Vec<Issue>, CrawlError> {
    let document = Html::parse_document(html);
    let section_selector = selector("section.archiv.jhrg", page_url)?;
    let link_selector = selector("a[href]", page_url)?;

    let mut issues = Vec::new();
    let mut found_section = false;

    for section in document.select(&section_selector) {
        found_section = true;
        for link in section.select(&link_selector) {
            let Some(href) = link.value().attr("href") else {
                continue;
            };
            if let Some(date) = issue_date(href, index_path) {
                issues.push(Issue {
                    date,
                    url: href.to_string(),
                });
            }
        }
    }

    if !found_section {
        return Err(markup_error(page_url, "no archive section in index page"));
    }

    Ok(issues)
}

/// Returns the issue date of an index link, if the link points to an issue
fn issue_date(href: &str, index_path: &str) -> Option<NaiveDate> {
    let date = href
        .strip_prefix(index_path)?
        .strip_prefix("?text=")?
        .get(..10)?;
    NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()
}

/// Extracts the article listing of an issue page
///
/// Each `li` of the listing must carry a `mediasyncid`, a first `div` with
/// the article link and a `strong` title, and a second `div` with the summary.
/// The `em` elements of the entry are its author fragments.
pub fn parse_issue(
    html: &str,
    page_url: &str,
    date: NaiveDate,
) -> Result<Vec<ArticleSummary>, CrawlError> {
    let document = Html::parse_document(html);
    let list_selector = selector("ul.inhaltsverz.verlinkt", page_url)?;
    let item_selector = selector("li", page_url)?;
    let div_selector = selector("div", page_url)?;
    let link_selector = selector("a[href]", page_url)?;
    let title_selector = selector("strong", page_url)?;
    let author_selector = selector("em", page_url)?;

    let list = document
        .select(&list_selector)
        .next()
        .ok_or_else(|| markup_error(page_url, "no article listing in issue page"))?;

    let mut summaries = Vec::new();
    for item in list.select(&item_selector) {
        let raw_id = item
            .value()
            .attr("mediasyncid")
            .ok_or_else(|| markup_error(page_url, "article entry without mediasyncid"))?;
        let id = raw_id
            .trim()
            .parse::<i64>()
            .map(ArticleId)
            .map_err(|_| markup_error(page_url, format!("invalid mediasyncid '{}'", raw_id)))?;

        let divs: Vec<ElementRef<'_>> = item.select(&div_selector).collect();
        let (title_div, summary_div) = match divs.as_slice() {
            [title_div, summary_div, ..] => (*title_div, *summary_div),
            _ => {
                return Err(markup_error(
                    page_url,
                    format!("article {} has fewer than two divs", id),
                ))
            }
        };

        let url = title_div
            .select(&link_selector)
            .next()
            .and_then(|a| a.value().attr("href"))
            .ok_or_else(|| markup_error(page_url, format!("article {} has no link", id)))?
            .to_string();

        let title = title_div
            .select(&title_selector)
            .next()
            .map(element_text)
            .ok_or_else(|| markup_error(page_url, format!("article {} has no title", id)))?;

        let fragments: Vec<String> = item.select(&author_selector).map(element_text).collect();

        summaries.push(ArticleSummary {
            id,
            url,
            title,
            date,
            summary: element_text(summary_div),
            authors: authors::normalize(&fragments)?,
        });
    }

    Ok(summaries)
}

/// Extracts headline, lead image and audio sources from an article page
pub fn parse_article(html: &str, page_url: &str) -> Result<ArticlePage, CrawlError> {
    let document = Html::parse_document(html);
    let heading_selector = selector("h1", page_url)?;
    let figure_selector = selector(r#"figure[role="group"]"#, page_url)?;
    let img_selector = selector("img", page_url)?;
    let audio_section_selector = selector("section.audio.feature", page_url)?;
    let player_selector = selector("audio#player2", page_url)?;

    let title = document
        .select(&heading_selector)
        .next()
        .map(element_text)
        .filter(|t| !t.is_empty());

    let image_url = match document.select(&figure_selector).next() {
        Some(figure) => Some(
            figure
                .select(&img_selector)
                .next()
                .and_then(|img| img.value().attr("src"))
                .ok_or_else(|| markup_error(page_url, "lead figure without image"))?
                .to_string(),
        ),
        None => None,
    };

    let mut media_urls = Vec::new();
    if let Some(section) = document.select(&audio_section_selector).next() {
        for player in section.select(&player_selector) {
            let src = player
                .value()
                .attr("src")
                .ok_or_else(|| markup_error(page_url, "audio player without src"))?;
            media_urls.push(src.to_string());
        }
    }

    Ok(ArticlePage {
        title,
        image_url,
        media_urls,
    })
}
