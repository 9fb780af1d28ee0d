//! Orchestration layer.
//!
//! Every operation runs the same state machine: serve mock data when mock
//! mode is on or the source host is down, return a fresh cache hit when one
//! exists, otherwise fetch + extract + write through to the cache. Any error
//! on the live path is absorbed here and substituted with mock data; nothing
//! below the API boundary ever raises past this layer.

use chrono::{Datelike, Utc};
use regex::Regex;
use tracing::{debug, warn};

use crate::config::ScraperConfig;
use crate::error::ScrapeError;
use crate::scraper::parsers::{ContestantParser, EventsParser, RacesParser, ResultsParser};
use crate::scraper::{self, mock, Cache, Fetcher};
use crate::search;
use crate::types::{ContestantDetail, DataSourceResponse, Event, Identifier, Race, RaceResult};

/// How many events the race scan walks before giving up on a race id.
const RACE_SCAN_LIMIT: usize = 20;

/// Default number of events fetched for listings and scans.
const EVENT_LIMIT: usize = 10;

pub struct ScrapeService {
    fetcher: Fetcher,
    cache: Cache,
    mock_mode: bool,
    recent_races: usize,
}

impl ScrapeService {
    pub fn new(config: &ScraperConfig) -> anyhow::Result<Self> {
        Ok(Self {
            fetcher: Fetcher::new()?,
            cache: Cache::new(config.cache_dir.clone(), config.cache),
            mock_mode: config.mock,
            recent_races: config.recent_races,
        })
    }

    /// Whether the live source should be consulted at all. Consults the
    /// cached reachability status and the short-lived failure marker before
    /// probing, so a known-down host is not hammered.
    async fn source_available(&self) -> bool {
        if self.mock_mode {
            return false;
        }
        if self.cache.source_recently_failed() {
            debug!("source marked down recently, skipping probe");
            return false;
        }
        if let Some(reachable) = self.cache.connection_status() {
            return reachable;
        }

        let reachable = self.fetcher.probe(&scraper::events_url()).await;
        self.cache.set_connection_status(reachable);
        reachable
    }

    /// Record a live-path failure; transient failures mark the host down.
    fn note_failure(&self, error: &ScrapeError) {
        if error.is_transient() {
            self.cache.set_connection_status(false);
        }
    }

    pub async fn events(&self, limit: usize) -> Vec<Event> {
        if !self.source_available().await {
            return mock::events(limit);
        }

        if let Some(events) = self.cache.get::<Vec<Event>>("events") {
            return truncated(events, limit);
        }

        match self.fetch_events().await {
            Ok(events) => {
                self.cache.put("events", &events);
                truncated(events, limit)
            }
            Err(e) => {
                warn!("live events fetch failed: {}", e);
                self.note_failure(&e);
                mock::events(limit)
            }
        }
    }

    async fn fetch_events(&self) -> Result<Vec<Event>, ScrapeError> {
        let url = scraper::events_url();
        let html = match self.fetcher.fetch(&url).await {
            Ok(html) => html,
            // One alternate listing URL is worth a short trial.
            Err(_) => {
                self.fetcher
                    .fetch_first(&[scraper::events_fallback_url()])
                    .await?
            }
        };

        let events = EventsParser::parse(&html, &url);
        if events.is_empty() {
            return Err(ScrapeError::EmptyExtraction(url));
        }
        Ok(events)
    }

    pub async fn races(&self, event_id: &str) -> Vec<Race> {
        if !self.source_available().await {
            return mock::races(event_id);
        }

        let key = format!("races:{}", event_id);
        if let Some(races) = self.cache.get::<Vec<Race>>(&key) {
            return races;
        }

        match self.fetch_races(event_id).await {
            Ok(races) => {
                self.cache.put(&key, &races);
                races
            }
            Err(e) => {
                warn!("live races fetch for {} failed: {}", event_id, e);
                self.note_failure(&e);
                if matches!(e, ScrapeError::EmptyExtraction(_))
                    && event_plausibly_future(event_id)
                {
                    debug!("synthesizing races for upcoming event {}", event_id);
                }
                mock::races(event_id)
            }
        }
    }

    async fn fetch_races(&self, event_id: &str) -> Result<Vec<Race>, ScrapeError> {
        let url = scraper::event_url(event_id);
        let html = self.fetcher.fetch(&url).await?;

        let owner = Identifier::Source(event_id.to_string());
        let races = RacesParser::parse(&html, &url, Some(&owner));
        if races.is_empty() {
            return Err(ScrapeError::EmptyExtraction(url));
        }
        Ok(races)
    }

    pub async fn results(&self, race_id: &str, category: &str) -> Vec<RaceResult> {
        if !self.source_available().await {
            return mock::results(race_id, &mock::race_display_name(race_id));
        }

        let key = format!("results:{}:{}", race_id, category);
        if let Some(results) = self.cache.get::<Vec<RaceResult>>(&key) {
            return results;
        }

        let race = self.find_race(race_id).await;
        let outcome = match &race {
            Some(race) => self.fetch_results(race, category).await,
            None => Err(ScrapeError::NotFound {
                kind: "race",
                id: race_id.to_string(),
            }),
        };

        match outcome {
            Ok(results) => {
                self.cache.put(&key, &results);
                results
            }
            Err(e) => {
                warn!("live results fetch for {} failed: {}", race_id, e);
                self.note_failure(&e);
                let name = race
                    .map(|r| r.name)
                    .unwrap_or_else(|| mock::race_display_name(race_id));
                mock::results(race_id, &name)
            }
        }
    }

    async fn fetch_results(
        &self,
        race: &Race,
        category: &str,
    ) -> Result<Vec<RaceResult>, ScrapeError> {
        let url = with_category(&race.url, category);
        let html = self.fetcher.fetch(&url).await?;

        let results = ResultsParser::parse(&html, race.id.as_str(), &race.name);
        if results.is_empty() {
            return Err(ScrapeError::EmptyExtraction(url));
        }
        Ok(results)
    }

    pub async fn contestant(
        &self,
        contestant_id: &str,
        race_id: Option<&str>,
    ) -> ContestantDetail {
        if !self.source_available().await {
            return mock::contestant(contestant_id)
                .unwrap_or_else(|| ContestantDetail::not_found(contestant_id));
        }

        let key = format!("contestant:{}:{}", contestant_id, race_id.unwrap_or(""));
        if let Some(detail) = self.cache.get::<ContestantDetail>(&key) {
            return detail;
        }

        let race = match race_id {
            Some(rid) => self.find_race(rid).await,
            None => None,
        };

        if let Some(race) = &race {
            // The detail page parameter name has shifted over time; each
            // candidate gets a short trial.
            let urls = vec![
                format!("{}&u={}", race.url, contestant_id),
                format!("{}&contestant={}", race.url, contestant_id),
            ];
            match self.fetcher.fetch_first(&urls).await {
                Ok(html) => {
                    if let Some(detail) = ContestantParser::parse(&html, contestant_id) {
                        self.cache.put(&key, &detail);
                        return detail;
                    }
                }
                Err(e) => {
                    warn!("contestant detail fetch for {} failed: {}", contestant_id, e);
                    self.note_failure(&e);
                }
            }

            // No richer detail page reachable; reconstruct from the row.
            let rows = self.results(race.id.as_str(), "overall").await;
            if let Some(row) = rows.iter().find(|r| r.id.as_str() == contestant_id) {
                let detail = ContestantDetail::from_result(row);
                self.cache.put(&key, &detail);
                return detail;
            }
        }

        mock::contestant(contestant_id)
            .unwrap_or_else(|| ContestantDetail::not_found(contestant_id))
    }

    pub async fn search(&self, query: &str) -> Vec<RaceResult> {
        let window = self.recent_race_window(self.recent_races).await;

        let mut pool = Vec::new();
        for race in &window {
            pool.extend(self.results(race.id.as_str(), "overall").await);
        }

        search::search(&pool, query)
    }

    pub async fn source_status(&self) -> DataSourceResponse {
        let live = !self.mock_mode && self.source_available().await;
        let connection_status = match self.cache.connection_status() {
            Some(true) => "connected",
            Some(false) => "disconnected",
            None => "unknown",
        };

        DataSourceResponse {
            source: if live { "real" } else { "mock" }.to_string(),
            cache_enabled: self.cache.is_enabled(),
            connection_status: connection_status.to_string(),
        }
    }

    /// The most recent races, drawn event by event in listing order.
    async fn recent_race_window(&self, max: usize) -> Vec<Race> {
        let mut races = Vec::new();
        for event in self.events(EVENT_LIMIT).await {
            races.extend(self.races(event.id.as_str()).await);
            if races.len() >= max {
                break;
            }
        }
        races.truncate(max);
        races
    }

    /// Resolve a race id against the recent-race scan window.
    async fn find_race(&self, race_id: &str) -> Option<Race> {
        self.recent_race_window(RACE_SCAN_LIMIT)
            .await
            .into_iter()
            .find(|r| r.id.as_str() == race_id)
    }
}

fn truncated<T>(mut items: Vec<T>, limit: usize) -> Vec<T> {
    items.truncate(limit);
    items
}

/// Replace or append the category query parameter of a results URL.
fn with_category(url: &str, category: &str) -> String {
    if url.contains("cat=") {
        let re = Regex::new(r"cat=[^&]*").unwrap();
        return re.replace(url, format!("cat={}", category)).into_owned();
    }
    if url.contains('?') {
        format!("{}&cat={}", url, category)
    } else {
        format!("{}?cat={}", url, category)
    }
}

/// Literal year-substring check on the event id; not a real date comparison.
fn event_plausibly_future(event_id: &str) -> bool {
    let year_re = Regex::new(r"20\d{2}").unwrap();
    year_re
        .find(event_id)
        .and_then(|m| m.as_str().parse::<i32>().ok())
        .map(|year| year >= Utc::now().year())
        .unwrap_or(false)
}
