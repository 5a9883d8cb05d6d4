use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::listing::{attach_ratings, require_creator, require_owner};
use crate::domain::{DomainError, EventFilter, ListingKind, Page, VenueFilter, VenueInput};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AuthUser;
use crate::services::media_service;
use crate::utils::time;

#[derive(Debug, Deserialize)]
pub struct VenueQuery {
    pub q: Option<String>,
    pub city: Option<String>,
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

pub async fn list_venues(
    State(state): State<AppState>,
    Query(params): Query<VenueQuery>,
) -> Result<Json<Value>, DomainError> {
    let filter = VenueFilter {
        query: params.q,
        city: params.city,
        page: Page {
            page: params.page,
            limit: params.limit,
        },
    };

    let mut result = state.venue_repo.find_all(filter).await?;
    attach_ratings(state.rating_repo.as_ref(), &mut result.items).await?;

    Ok(Json(json!({
        "venues": result.items,
        "total": result.total
    })))
}

pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let mut venue = state
        .venue_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Venue"))?;
    attach_ratings(state.rating_repo.as_ref(), std::slice::from_mut(&mut venue)).await?;

    let upcoming = state
        .event_repo
        .find_all(EventFilter {
            venue_id: Some(id),
            starts_after: Some(time::now()),
            ..Default::default()
        })
        .await?;

    Ok(Json(json!({
        "venue": venue,
        "upcoming_events": upcoming.items
    })))
}

pub async fn create_venue(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<VenueInput>,
) -> Result<impl IntoResponse, DomainError> {
    require_creator(&user, ListingKind::Venue)?;

    let venue = state.venue_repo.create(user.id, payload).await?;
    tracing::info!("User {} created venue {} ({})", user.username, venue.name, venue.id);

    Ok((StatusCode::CREATED, Json(json!({ "venue": venue }))))
}

pub async fn update_venue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<VenueInput>,
) -> Result<Json<Value>, DomainError> {
    let existing = state
        .venue_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Venue"))?;
    require_owner(&user, existing.user_id)?;

    let mut venue = state.venue_repo.update(id, payload).await?;
    attach_ratings(state.rating_repo.as_ref(), std::slice::from_mut(&mut venue)).await?;

    Ok(Json(json!({ "venue": venue })))
}

pub async fn delete_venue(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    let existing = state
        .venue_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Venue"))?;
    require_owner(&user, existing.user_id)?;

    let dir = media_service::listing_dir(state.media_repo.as_ref(), ListingKind::Venue, id).await?;
    state.venue_repo.delete(id).await?;
    if let Some(dir) = dir {
        state.storage.remove_dir(&dir).await;
    }

    tracing::info!("User {} deleted venue {}", user.username, id);
    Ok(StatusCode::NO_CONTENT)
}
