//! Race-list parser for an event page.
//!
//! An event page links each of its races to a shared results page with a
//! `race` query parameter. The trailing path segment is therefore useless as
//! an identifier and races usually get synthetic `race-<n>` ids.

use scraper::{Html, Selector};
use tracing::debug;

use super::{element_text, identifier_from_url, query_param, resolve_url};
use crate::scraper::classify::{classify_race, extract_distance_km};
use crate::types::{Identifier, Race};

/// Parser for event pages listing races
pub struct RacesParser;

impl RacesParser {
    pub fn parse(html: &str, base_url: &str, event_id: Option<&Identifier>) -> Vec<Race> {
        let document = Html::parse_document(html);

        let strategies: [&str; 3] = [
            // Results links are the most reliable shape.
            "a[href*='urslit']",
            "div.ibox-content a[href], .list-group a[href]",
            "a[href*='race=']",
        ];

        for (i, selector_str) in strategies.iter().enumerate() {
            let Ok(selector) = Selector::parse(selector_str) else {
                continue;
            };
            let races = Self::collect(document.select(&selector), base_url, event_id);
            if !races.is_empty() {
                debug!("races strategy {} yielded {} races", i, races.len());
                return races;
            }
        }

        Vec::new()
    }

    fn collect<'a>(
        anchors: impl Iterator<Item = scraper::ElementRef<'a>>,
        base_url: &str,
        event_id: Option<&Identifier>,
    ) -> Vec<Race> {
        let mut races = Vec::new();
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

            let id = identifier_from_url(&url).unwrap_or_else(|| {
                match query_param(&url, "race") {
                    Some(n) => Identifier::Synthetic(format!("race-{}", n)),
                    None => Identifier::Synthetic(format!("race-{}", i)),
                }
            });

            seen_urls.push(url.clone());
            races.push(Race {
                id,
                kind: classify_race(&name),
                distance_km: extract_distance_km(&name),
                name,
                url,
                event_id: event_id.cloned(),
            });
        }

        races
    }
}
