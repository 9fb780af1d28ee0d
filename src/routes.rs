//! API route handlers.
//!
//! Every endpoint answers 200 with a best-effort body; scraping failures are
//! absorbed by the orchestration layer and never surface as 5xx. The only
//! client-visible error is a 400 for a missing required parameter.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Deserialize;
use std::sync::Arc;

use crate::service::ScrapeService;
use crate::types::{ContestantDetail, DataSourceResponse, ErrorResponse, HealthResponse};

/// Application state shared across handlers.
pub struct AppState {
    pub service: ScrapeService,
}

/// Error type for API handlers.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    pub fn bad_request(msg: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.into(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.status.to_string(),
            message: self.message,
        });
        (self.status, body).into_response()
    }
}

/// Health check endpoint.
pub async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "OK".to_string(),
    })
}

#[derive(Debug, Deserialize)]
pub struct EventsParams {
    pub limit: Option<usize>,
}

/// Recent events.
pub async fn events(
    State(state): State<Arc<AppState>>,
    Query(params): Query<EventsParams>,
) -> Json<Vec<crate::types::Event>> {
    let limit = params.limit.unwrap_or(10);
    Json(state.service.events(limit).await)
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RacesParams {
    pub event_id: Option<String>,
    pub race_id: Option<String>,
    pub category_id: Option<String>,
}

/// Races for an event, or results for a race when `raceId` is given.
pub async fn races(
    State(state): State<Arc<AppState>>,
    Query(params): Query<RacesParams>,
) -> Result<Response, ApiError> {
    if let Some(race_id) = &params.race_id {
        let category = params.category_id.as_deref().unwrap_or("overall");
        let results = state.service.results(race_id, category).await;
        return Ok(Json(results).into_response());
    }

    if let Some(event_id) = &params.event_id {
        let races = state.service.races(event_id).await;
        return Ok(Json(races).into_response());
    }

    Err(ApiError::bad_request("eventId or raceId is required"))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestantParams {
    pub race_id: Option<String>,
}

/// Contestant detail, best-effort: unknown ids get a synthetic record with
/// an Error status rather than a 404.
pub async fn contestant(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Query(params): Query<ContestantParams>,
) -> Json<ContestantDetail> {
    let detail = state
        .service
        .contestant(&id, params.race_id.as_deref())
        .await;
    Json(detail)
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub name: Option<String>,
}

/// Contestant search; the query may embed a birth year.
pub async fn search(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchParams>,
) -> Result<Json<Vec<crate::types::RaceResult>>, ApiError> {
    let Some(name) = params.name.filter(|n| !n.trim().is_empty()) else {
        return Err(ApiError::bad_request("name is required"));
    };
    Ok(Json(state.service.search(&name).await))
}

/// Data source diagnostics.
pub async fn data_source(State(state): State<Arc<AppState>>) -> Json<DataSourceResponse> {
    Json(state.service.source_status().await)
}
