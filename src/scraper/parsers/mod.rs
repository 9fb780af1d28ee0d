//! HTML parsers for timataka.net pages.
//!
//! Every parser applies an ordered list of selector strategies, most specific
//! first, and stops at the first strategy that yields candidates. Strategies
//! are never merged. Parsers never fail on malformed markup; they return what
//! could be salvaged, an empty collection at worst.

pub mod contestant;
pub mod events;
pub mod races;
pub mod results;

pub use contestant::ContestantParser;
pub use events::EventsParser;
pub use races::RacesParser;
pub use results::ResultsParser;

use regex::Regex;
use scraper::ElementRef;

use crate::types::Identifier;

/// Trailing path segments too generic to identify a record.
const GENERIC_SEGMENTS: [&str; 3] = ["urslit", "index.php", "results"];

/// Resolve a possibly-relative href against the page it was found on.
pub(crate) fn resolve_url(base: &str, href: &str) -> String {
    if href.starts_with("http://") || href.starts_with("https://") {
        return href.to_string();
    }
    if let Some(rest) = href.strip_prefix('/') {
        let origin = match base.find("://").map(|i| i + 3) {
            Some(start) => match base[start..].find('/') {
                Some(end) => &base[..start + end],
                None => base,
            },
            None => base,
        };
        return format!("{}/{}", origin.trim_end_matches('/'), rest);
    }
    match base.rfind('/') {
        Some(i) => format!("{}/{}", &base[..i], href),
        None => format!("{}/{}", base, href),
    }
}

/// Derive a source identifier from the last non-empty path segment of a URL.
/// Generic segments (e.g. a shared results page name) are unusable; the
/// caller falls back to a synthetic id.
pub(crate) fn identifier_from_url(url: &str) -> Option<Identifier> {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let path = path.split("://").last().unwrap_or(path);
    let segment = path.split('/').rev().find(|s| !s.is_empty())?;
    if GENERIC_SEGMENTS.contains(&segment.to_lowercase().as_str()) || segment.contains('.') {
        return None;
    }
    // The host alone is not an identifier.
    if segment.contains(':') || path.trim_end_matches('/').find('/').is_none() {
        return None;
    }
    Some(Identifier::Source(segment.to_string()))
}

/// Extract a query parameter value from a URL.
pub(crate) fn query_param(url: &str, name: &str) -> Option<String> {
    let query = url.split('?').nth(1)?;
    query
        .split('&')
        .filter_map(|pair| pair.split_once('='))
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.to_string())
}

/// Collapsed, trimmed text content of an element.
pub(crate) fn element_text(el: &ElementRef) -> String {
    el.text().collect::<String>().trim().to_string()
}

/// A 4-digit year prefixed 19 or 20.
pub(crate) fn year_re() -> Regex {
    Regex::new(r"\b((?:19|20)\d{2})\b").unwrap()
}

/// Birth-year extraction policy, tried in order, first match wins:
/// 1. a year in the name anchor's title attribute,
/// 2. a parenthesized year following the displayed name,
/// 3. a bare year anywhere in the category/club text.
/// No match means no birth year; it is never guessed.
pub(crate) fn extract_birth_year(
    anchor_title: Option<&str>,
    name_text: &str,
    category_text: &str,
) -> Option<String> {
    let year = year_re();

    if let Some(title) = anchor_title {
        if let Some(caps) = year.captures(title) {
            return Some(caps[1].to_string());
        }
    }

    let paren = Regex::new(r"\(((?:19|20)\d{2})\)").unwrap();
    if let Some(caps) = paren.captures(name_text) {
        return Some(caps[1].to_string());
    }

    if let Some(caps) = year.captures(category_text) {
        return Some(caps[1].to_string());
    }

    None
}

/// Strip a trailing parenthesized birth year from a displayed name.
pub(crate) fn strip_year_parens(name: &str) -> String {
    let paren = Regex::new(r"\s*\((?:19|20)\d{2}\)").unwrap();
    paren.replace_all(name, "").trim().to_string()
}

/// Lowercase, dash-separated token for use in synthetic identifiers.
pub(crate) fn slugify(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '-' })
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_url() {
        assert_eq!(
            resolve_url("https://timataka.net/", "/rvk2025/urslit/"),
            "https://timataka.net/rvk2025/urslit/"
        );
        assert_eq!(
            resolve_url("https://timataka.net/rvk2025/", "urslit/?race=1"),
            "https://timataka.net/rvk2025/urslit/?race=1"
        );
        assert_eq!(
            resolve_url("https://timataka.net/", "https://example.is/x"),
            "https://example.is/x"
        );
    }

    #[test]
    fn test_identifier_from_url() {
        assert_eq!(
            identifier_from_url("https://timataka.net/midnaeturhlaup-2025/"),
            Some(Identifier::Source("midnaeturhlaup-2025".into()))
        );
        // Generic results segment is unusable.
        assert_eq!(
            identifier_from_url("https://timataka.net/rvk2025/urslit/?race=2"),
            None
        );
        // Bare host has no path segment to use.
        assert_eq!(identifier_from_url("https://timataka.net/"), None);
    }

    #[test]
    fn test_query_param() {
        let url = "https://timataka.net/rvk2025/urslit/?race=2&cat=overall";
        assert_eq!(query_param(url, "race"), Some("2".into()));
        assert_eq!(query_param(url, "cat"), Some("overall".into()));
        assert_eq!(query_param(url, "missing"), None);
    }

    #[test]
    fn test_birth_year_policy_order() {
        // Title attribute wins.
        assert_eq!(
            extract_birth_year(Some("Jón Jónsson (1985)"), "Jón Jónsson (1990)", "1995"),
            Some("1985".into())
        );
        // Then parenthesized year after the name.
        assert_eq!(
            extract_birth_year(None, "Jón Jónsson (1990)", "1995"),
            Some("1990".into())
        );
        // Then a bare year in the category/club column.
        assert_eq!(
            extract_birth_year(None, "Jón Jónsson", "M 1995"),
            Some("1995".into())
        );
        // Never guessed.
        assert_eq!(extract_birth_year(None, "Jón Jónsson", "M40-44"), None);
    }

    #[test]
    fn test_birth_year_requires_century_prefix() {
        assert_eq!(extract_birth_year(None, "Runner (1880)", "3065"), None);
    }

    #[test]
    fn test_strip_year_parens() {
        assert_eq!(strip_year_parens("Jón Jónsson (1985)"), "Jón Jónsson");
        assert_eq!(strip_year_parens("Jón Jónsson"), "Jón Jónsson");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Jón Jónsson"), "jón-jónsson");
        assert_eq!(slugify("  10 km  "), "10-km");
    }
}
