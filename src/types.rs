//! Domain records and API response types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// How a record's identifier was derived.
///
/// `Source` ids come from the results site itself (last URL path segment or an
/// explicit id in an anchor) and are stable across scrapes. `Synthetic` ids
/// are generated from positional data and carry no identity guarantee.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Identifier {
    Source(String),
    Synthetic(String),
}

impl Identifier {
    pub fn as_str(&self) -> &str {
        match self {
            Identifier::Source(s) | Identifier::Synthetic(s) => s,
        }
    }

    #[allow(dead_code)]
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Identifier::Synthetic(_))
    }
}

impl std::fmt::Display for Identifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A competition occasion, possibly containing several races.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: Identifier,
    pub name: String,
    /// Free-text date as the source presents it, e.g. "24.08.2025".
    pub date: String,
    pub url: String,
}

/// A single distance/category competition within an event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Race {
    pub id: Identifier,
    pub name: String,
    pub url: String,
    /// Weak reference; may name an event that is not in the events set.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_id: Option<Identifier>,
    pub kind: RaceKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
}

/// Race classification derived from the race name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RaceKind {
    Marathon,
    HalfMarathon,
    TenK,
    FiveK,
    Trail,
    Other,
}

/// One contestant's row in a race results table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RaceResult {
    pub id: Identifier,
    /// Position as displayed; may be a non-numeric placeholder ("DNF", "-").
    pub position: String,
    pub name: String,
    pub bib: String,
    pub club: String,
    pub category: String,
    pub time: String,
    pub birth_year: Option<String>,
    pub race_id: String,
    pub race_name: String,
}

/// Contestant progress state on a detail page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContestantStatus {
    Finished,
    #[serde(rename = "In progress")]
    InProgress,
    #[serde(rename = "Not started")]
    NotStarted,
    Error,
}

/// One intermediate timing checkpoint for a contestant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Split {
    pub checkpoint: String,
    pub distance: String,
    pub split_time: String,
    pub cumulative_time: String,
    pub position: String,
}

/// Full per-contestant record with split times.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContestantDetail {
    pub id: Identifier,
    pub name: String,
    pub bib: String,
    pub category: String,
    pub club: String,
    pub birth_year: Option<String>,
    pub final_time: String,
    pub splits: Vec<Split>,
    pub checkpoint_count: usize,
    pub last_updated: DateTime<Utc>,
    pub status: ContestantStatus,
}

impl ContestantDetail {
    /// Best-effort reconstruction from a results row when no richer detail
    /// page is reachable.
    pub fn from_result(result: &RaceResult) -> Self {
        let status = if result.time.trim().is_empty() {
            ContestantStatus::NotStarted
        } else {
            ContestantStatus::Finished
        };
        Self {
            id: result.id.clone(),
            name: result.name.clone(),
            bib: result.bib.clone(),
            category: result.category.clone(),
            club: result.club.clone(),
            birth_year: result.birth_year.clone(),
            final_time: result.time.clone(),
            splits: Vec::new(),
            checkpoint_count: 0,
            last_updated: Utc::now(),
            status,
        }
    }

    /// Synthetic record for an id absent from both live and mock datasets.
    pub fn not_found(id: &str) -> Self {
        Self {
            id: Identifier::Synthetic(id.to_string()),
            name: format!("Contestant {} not found", id),
            bib: String::new(),
            category: String::new(),
            club: String::new(),
            birth_year: None,
            final_time: String::new(),
            splits: Vec::new(),
            checkpoint_count: 0,
            last_updated: Utc::now(),
            status: ContestantStatus::Error,
        }
    }
}

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Data source diagnostics response.
#[derive(Debug, Serialize)]
pub struct DataSourceResponse {
    pub source: String,
    pub cache_enabled: bool,
    pub connection_status: String,
}

/// API error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}
