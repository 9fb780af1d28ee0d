//! Events parser for the timataka.net front page.
//!
//! The front page lists recent and upcoming events as anchors, normally
//! inside `ibox-content` panels. Markup has shifted over the years, so the
//! parser walks a cascade of strategies from the known container classes down
//! to "any anchor that looks like an event link".

use regex::Regex;
use scraper::{Html, Selector};
use tracing::debug;

use super::{element_text, identifier_from_url, resolve_url};
use crate::types::{Event, Identifier};

/// Parser for the event listing page
pub struct EventsParser;

impl EventsParser {
    /// Parse the event listing. Returns an empty list when no strategy finds
    /// anything; never fails on malformed markup.
    pub fn parse(html: &str, base_url: &str) -> Vec<Event> {
        let document = Html::parse_document(html);

        let strategies: [fn(&Html, &str) -> Vec<Event>; 3] = [
            Self::from_ibox_panels,
            Self::from_tables,
            Self::from_any_anchor,
        ];

        for (i, strategy) in strategies.iter().enumerate() {
            let events = strategy(&document, base_url);
            if !events.is_empty() {
                debug!("events strategy {} yielded {} events", i, events.len());
                return events;
            }
        }

        debug!("no events strategy matched");
        Vec::new()
    }

    /// Known layout: event links inside ibox panels.
    fn from_ibox_panels(document: &Html, base_url: &str) -> Vec<Event> {
        let selector = Selector::parse("div.ibox-content li a[href], div.ibox-content td a[href]")
            .unwrap();
        Self::collect(document.select(&selector), base_url)
    }

    /// Older layout: a plain table of events.
    fn from_tables(document: &Html, base_url: &str) -> Vec<Event> {
        let selector = Selector::parse("table a[href]").unwrap();
        Self::collect(document.select(&selector), base_url)
    }

    /// Last resort: any on-site anchor whose target or text looks like an
    /// event (a single path segment, or a name carrying a year).
    fn from_any_anchor(document: &Html, base_url: &str) -> Vec<Event> {
        let selector = Selector::parse("a[href]").unwrap();
        let year_re = Regex::new(r"\b20\d{2}\b").unwrap();

        let candidates = document.select(&selector).filter(|el| {
            let href = el.value().attr("href").unwrap_or("");
            if href.starts_with('#') || href.starts_with("mailto:") {
                return false;
            }
            let text = element_text(el);
            if text.is_empty() {
                return false;
            }
            let url = resolve_url(base_url, href);
            identifier_from_url(&url).is_some() || year_re.is_match(&text)
        });
        Self::collect(candidates, base_url)
    }

    fn collect<'a>(
        anchors: impl Iterator<Item = scraper::ElementRef<'a>>,
        base_url: &str,
    ) -> Vec<Event> {
        let date_re = Regex::new(r"\b\d{1,2}\.\d{1,2}\.\d{4}\b").unwrap();
        let mut events = Vec::new();
        let mut seen_urls = Vec::new();

        for (i, anchor) in anchors.enumerate() {
            let Some(href) = anchor.value().attr("href") else {
                continue;
            };
            let name = element_text(&anchor);
            if name.is_empty() {
                continue;
            }

            let url = resolve_url(base_url, href);
            if seen_urls.contains(&url) {
                continue;
            }

            let id = identifier_from_url(&url)
                .unwrap_or_else(|| Identifier::Synthetic(format!("event-{}", i)));

            // The date, when shown, sits in the surrounding list item or row
            // as free text like "24.08.2025".
            let date = anchor
                .parent()
                .and_then(scraper::ElementRef::wrap)
                .map(|parent| parent.text().collect::<String>())
                .and_then(|text| date_re.find(&text).map(|m| m.as_str().to_string()))
                .unwrap_or_default();

            seen_urls.push(url.clone());
            events.push(Event { id, name, date, url });
        }

        events
    }
}
