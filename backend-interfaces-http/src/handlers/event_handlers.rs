use axum::extract::{Path, Query, State};
use axum::response::{IntoResponse, Response};
use axum::Json;

use backend_application::queries::event_queries;
use backend_application::AppState;
use backend_domain::{Event, EventFilters, EventListParams, EventPage};

use crate::error::HttpError;

/// Query string as ordered pairs, so a repeated key cannot fail extraction.
type QueryPairs = Vec<(String, String)>;

/// `GET /events`. With `id` present this is a single-event lookup and the
/// bare event object is returned instead of the paginated envelope.
pub async fn list_events(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Response, HttpError> {
    let params = EventListParams::from_pairs(pairs);
    if let Some(raw_id) = params.id.as_deref() {
        let event = event_queries::get_event(&state, raw_id).await?;
        return Ok(Json(event).into_response());
    }
    let page = run_listing(&state, &params).await?;
    Ok(Json(page).into_response())
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(raw_id): Path<String>,
) -> Result<Json<Event>, HttpError> {
    let event = event_queries::get_event(&state, &raw_id).await?;
    Ok(Json(event))
}

pub async fn list_featured_events(
    State(state): State<AppState>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<EventPage>, HttpError> {
    let mut params = EventListParams::from_pairs(pairs);
    params.featured = Some("1".to_string());
    Ok(Json(run_listing(&state, &params).await?))
}

pub async fn list_events_by_category(
    State(state): State<AppState>,
    Path(category): Path<String>,
    Query(pairs): Query<QueryPairs>,
) -> Result<Json<EventPage>, HttpError> {
    let mut params = EventListParams::from_pairs(pairs);
    params.category = Some(category);
    Ok(Json(run_listing(&state, &params).await?))
}

pub async fn method_not_allowed() -> HttpError {
    HttpError::MethodNotAllowed
}

async fn run_listing(state: &AppState, params: &EventListParams) -> Result<EventPage, HttpError> {
    let filters = EventFilters::from_params(params);
    Ok(event_queries::list_events(state, filters).await?)
}
