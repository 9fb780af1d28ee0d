//! Web scraper module for timataka.net
//!
//! Provides the HTTP fetcher, response cache, HTML parsers and the static
//! mock dataset used when the source is unreachable.

pub mod cache;
pub mod classify;
pub mod client;
pub mod mock;
pub mod parsers;

pub use cache::Cache;
pub use client::Fetcher;

/// Base URL for timataka.net
pub const BASE_URL: &str = "https://timataka.net";

/// Front page listing recent and upcoming events
pub fn events_url() -> String {
    format!("{}/", BASE_URL)
}

/// Alternate event listing tried when the front page yields nothing
pub fn events_fallback_url() -> String {
    format!("{}/mot/", BASE_URL)
}

/// Event page listing its races
pub fn event_url(event_id: &str) -> String {
    format!("{}/{}/", BASE_URL, event_id)
}

/// Results page for one race within an event
pub fn race_results_url(event_id: &str, race: u32, category: &str) -> String {
    format!(
        "{}/{}/urslit/?race={}&cat={}",
        BASE_URL, event_id, race, category
    )
}
