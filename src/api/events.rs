use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::{Deserialize, Deserializer};
use serde_json::{Value, json};
use utoipa::IntoParams;

use super::listing::{attach_ratings, require_creator, require_owner};
use crate::domain::{DomainError, Event, EventFilter, EventInput, ListingKind, Page};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AuthUser;
use crate::services::media_service;
use crate::utils::time;

/// Distinguish an absent field (`None`) from an explicit `null` (`Some(None)`)
fn nullable<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EventQuery {
    /// Search in name and description
    pub q: Option<String>,
    /// Events at this venue
    pub venue_id: Option<i32>,
    /// Events with this artist in the lineup
    pub artist_id: Option<i32>,
    /// Events by this organiser
    pub organiser_id: Option<i32>,
    /// Only events that have not started
    pub upcoming: Option<bool>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct EventRequest {
    pub name: Option<String>,
    pub description: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub venue_id: Option<Option<i32>>,
    pub starts_at: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub ends_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub ticket_price: Option<Option<f64>>,
    pub ticket_url: Option<String>,
}

/// Validate a request against the current row (if any) and normalise timestamps
async fn build_input(
    state: &AppState,
    request: EventRequest,
    existing: Option<&Event>,
) -> Result<EventInput, DomainError> {
    let starts_at = request
        .starts_at
        .as_deref()
        .map(|raw| time::normalize("starts_at", raw))
        .transpose()?;
    if existing.is_none() && starts_at.is_none() {
        return Err(DomainError::validation("starts_at is required"));
    }

    let ends_at = match request.ends_at {
        None => None,
        Some(None) => Some(None),
        Some(Some(raw)) if raw.trim().is_empty() => Some(None),
        Some(Some(raw)) => Some(Some(time::normalize("ends_at", &raw)?)),
    };

    let effective_start = starts_at
        .as_deref()
        .or(existing.map(|e| e.starts_at.as_str()));
    let effective_end = match &ends_at {
        Some(value) => value.as_deref(),
        None => existing.and_then(|e| e.ends_at.as_deref()),
    };
    if let (Some(start), Some(end)) = (effective_start, effective_end)
        && end < start
    {
        return Err(DomainError::validation("ends_at must not be before starts_at"));
    }

    if let Some(Some(price)) = request.ticket_price
        && (!price.is_finite() || price < 0.0)
    {
        return Err(DomainError::validation("ticket_price must be 0 or more"));
    }

    if let Some(Some(venue_id)) = request.venue_id
        && state.venue_repo.find_by_id(venue_id).await?.is_none()
    {
        return Err(DomainError::Validation(format!(
            "Venue {} does not exist",
            venue_id
        )));
    }

    Ok(EventInput {
        name: request.name,
        description: request.description,
        venue_id: request.venue_id,
        starts_at,
        ends_at,
        ticket_price: request.ticket_price,
        ticket_url: request.ticket_url,
    })
}

async fn find_event(state: &AppState, id: i32) -> Result<Event, DomainError> {
    state
        .event_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Event"))
}

#[utoipa::path(
    get,
    path = "/api/events",
    params(EventQuery),
    responses((status = 200, description = "Events ordered by start time"))
)]
pub async fn list_events(
    State(state): State<AppState>,
    Query(params): Query<EventQuery>,
) -> Result<Json<Value>, DomainError> {
    let filter = EventFilter {
        query: params.q,
        venue_id: params.venue_id,
        artist_id: params.artist_id,
        organiser_id: params.organiser_id,
        starts_after: params.upcoming.unwrap_or(false).then(time::now),
        page: Page {
            page: params.page,
            limit: params.limit,
        },
    };

    let mut result = state.event_repo.find_all(filter).await?;
    attach_ratings(state.rating_repo.as_ref(), &mut result.items).await?;

    Ok(Json(json!({
        "events": result.items,
        "total": result.total
    })))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let mut event = find_event(&state, id).await?;
    attach_ratings(state.rating_repo.as_ref(), std::slice::from_mut(&mut event)).await?;

    let venue = match event.venue_id {
        Some(venue_id) => state.venue_repo.find_by_id(venue_id).await?,
        None => None,
    };
    let lineup = state.event_repo.lineup(id).await?;

    Ok(Json(json!({
        "event": event,
        "venue": venue,
        "lineup": lineup
    })))
}

pub async fn create_event(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<EventRequest>,
) -> Result<impl IntoResponse, DomainError> {
    require_creator(&user, ListingKind::Event)?;

    let input = build_input(&state, payload, None).await?;
    let event = state.event_repo.create(user.id, input).await?;
    tracing::info!("User {} created event {} ({})", user.username, event.name, event.id);

    Ok((StatusCode::CREATED, Json(json!({ "event": event }))))
}

pub async fn update_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<EventRequest>,
) -> Result<Json<Value>, DomainError> {
    let existing = find_event(&state, id).await?;
    require_owner(&user, existing.organiser_id)?;

    let input = build_input(&state, payload, Some(&existing)).await?;
    let mut event = state.event_repo.update(id, input).await?;
    attach_ratings(state.rating_repo.as_ref(), std::slice::from_mut(&mut event)).await?;

    Ok(Json(json!({ "event": event })))
}

pub async fn delete_event(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    let existing = find_event(&state, id).await?;
    require_owner(&user, existing.organiser_id)?;

    let dir = media_service::listing_dir(state.media_repo.as_ref(), ListingKind::Event, id).await?;
    state.event_repo.delete(id).await?;
    if let Some(dir) = dir {
        state.storage.remove_dir(&dir).await;
    }

    tracing::info!("User {} deleted event {}", user.username, id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn add_lineup_artist(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, artist_id)): Path<(i32, i32)>,
) -> Result<Json<Value>, DomainError> {
    let event = find_event(&state, id).await?;
    require_owner(&user, event.organiser_id)?;

    if state.artist_repo.find_by_id(artist_id).await?.is_none() {
        return Err(DomainError::not_found("Artist"));
    }

    state.event_repo.add_to_lineup(id, artist_id).await?;
    let lineup = state.event_repo.lineup(id).await?;

    Ok(Json(json!({ "lineup": lineup })))
}

pub async fn remove_lineup_artist(
    State(state): State<AppState>,
    user: AuthUser,
    Path((id, artist_id)): Path<(i32, i32)>,
) -> Result<Json<Value>, DomainError> {
    let event = find_event(&state, id).await?;
    require_owner(&user, event.organiser_id)?;

    if !state.event_repo.remove_from_lineup(id, artist_id).await? {
        return Err(DomainError::NotFound(
            "Artist is not in the lineup".to_string(),
        ));
    }
    let lineup = state.event_repo.lineup(id).await?;

    Ok(Json(json!({ "lineup": lineup })))
}
