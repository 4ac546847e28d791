//! Author name normalization
//!
//! Issue listings render authors as a run of `<em>` fragments such as
//! `["von", "Jane Doe"]` or `["A, B und C"]`. This module turns those
//! fragments into one clean name per author.

use crate::CrawlError;

/// Connector word introducing the author list ("by")
const BY: &str = "von";

/// Prefixes stripped from individual fragments
const BY_PREFIXES: &[&str] = &["von ", "Von "];

/// Conjunction joining the last two authors of a list
const AND: &str = " und ";

/// Normalizes raw author fragments into individual author names
///
/// # Rules
///
/// 1. A leading fragment that is exactly `von` (after trimming) is dropped
/// 2. Each fragment loses a leading `von `/`Von ` and surrounding whitespace
/// 3. Fragments without ` und ` are one author each; empty ones are skipped
/// 4. Fragments with ` und ` are split on commas, and the last element is
///    split again on ` und `
///
/// # Errors
///
/// Returns [`CrawlError::AuthorNormalization`] if a resulting name still
/// contains a comma. That means the listing changed shape and the name
/// would be stored malformed.
///
/// # Example
///
/// ```
/// use lmd_audio_crawler::authors::normalize;
///
/// let names = normalize(&["A, B und C"]).unwrap();
/// assert_eq!(names, vec!["A", "B", "C"]);
/// ```
pub fn normalize<S: AsRef<str>>(raw_fragments: &[S]) -> Result<Vec<String>, CrawlError> {
    let fragments = match raw_fragments.split_first() {
        Some((first, rest)) if first.as_ref().trim() == BY => rest,
        _ => raw_fragments,
    };

    let mut authors = Vec::new();
    for fragment in fragments {
        let fragment = strip_by_prefix(fragment.as_ref().trim()).trim();
        if fragment.is_empty() {
            continue;
        }

        if fragment.contains(AND) {
            split_author_list(fragment, &mut authors);
        } else {
            authors.push(fragment.to_string());
        }
    }

    if let Some(name) = authors.iter().find(|name| name.contains(',')) {
        return Err(CrawlError::AuthorNormalization { name: name.clone() });
    }

    Ok(authors)
}

fn strip_by_prefix(fragment: &str) -> &str {
    BY_PREFIXES
        .iter()
        .find_map(|prefix| fragment.strip_prefix(prefix))
        .unwrap_or(fragment)
}

/// Splits "A, B und C" into its names
fn split_author_list(fragment: &str, authors: &mut Vec<String>) {
    let mut parts: Vec<&str> = fragment.split(',').map(str::trim).collect();
    let last = parts.pop().unwrap_or_default();

    let names = parts.into_iter().chain(last.split(AND).map(str::trim));
    authors.extend(
        names
            .filter(|name| !name.is_empty())
            .map(ToString::to_string),
    );
}
