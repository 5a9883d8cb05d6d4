use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::IntoParams;

use super::listing::{attach_ratings, require_creator, require_owner};
use crate::domain::{ArtistFilter, ArtistInput, DomainError, EventFilter, ListingKind, Page};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AuthUser;
use crate::services::media_service;
use crate::utils::time;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ArtistQuery {
    /// Search in name, genre and bio
    pub q: Option<String>,
    /// Genre contains
    pub genre: Option<String>,
    /// Location contains
    pub location: Option<String>,
    /// Zero-based page
    pub page: Option<u64>,
    /// Page size
    pub limit: Option<u64>,
}

#[utoipa::path(
    get,
    path = "/api/artists",
    params(ArtistQuery),
    responses((status = 200, description = "Artists with rating summaries"))
)]
pub async fn list_artists(
    State(state): State<AppState>,
    Query(params): Query<ArtistQuery>,
) -> Result<Json<Value>, DomainError> {
    let filter = ArtistFilter {
        page: Page {
            page: params.page,
            limit: params.limit,
        },
        query: params.q,
        genre: params.genre,
        location: params.location,
    };

    let mut result = state.artist_repo.find_all(filter).await?;
    attach_ratings(state.rating_repo.as_ref(), &mut result.items).await?;

    Ok(Json(json!({
        "artists": result.items,
        "total": result.total
    })))
}

#[utoipa::path(
    get,
    path = "/api/artists/{id}",
    params(("id" = i32, Path, description = "Artist id")),
    responses(
        (status = 200, description = "Artist with upcoming events"),
        (status = 404, description = "Artist not found")
    )
)]
pub async fn get_artist(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let mut artist = state
        .artist_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Artist"))?;
    attach_ratings(state.rating_repo.as_ref(), std::slice::from_mut(&mut artist)).await?;

    let upcoming = state
        .event_repo
        .find_all(EventFilter {
            artist_id: Some(id),
            starts_after: Some(time::now()),
            ..Default::default()
        })
        .await?;

    Ok(Json(json!({
        "artist": artist,
        "upcoming_events": upcoming.items
    })))
}

pub async fn create_artist(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<ArtistInput>,
) -> Result<impl IntoResponse, DomainError> {
    require_creator(&user, ListingKind::Artist)?;

    let artist = state.artist_repo.create(user.id, payload).await?;
    tracing::info!("User {} created artist {} ({})", user.username, artist.name, artist.id);

    Ok((StatusCode::CREATED, Json(json!({ "artist": artist }))))
}

pub async fn update_artist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<ArtistInput>,
) -> Result<Json<Value>, DomainError> {
    let existing = state
        .artist_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Artist"))?;
    require_owner(&user, existing.user_id)?;

    let mut artist = state.artist_repo.update(id, payload).await?;
    attach_ratings(state.rating_repo.as_ref(), std::slice::from_mut(&mut artist)).await?;

    Ok(Json(json!({ "artist": artist })))
}

pub async fn delete_artist(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    let existing = state
        .artist_repo
        .find_by_id(id)
        .await?
        .ok_or_else(|| DomainError::not_found("Artist"))?;
    require_owner(&user, existing.user_id)?;

    let dir = media_service::listing_dir(state.media_repo.as_ref(), ListingKind::Artist, id).await?;
    state.artist_repo.delete(id).await?;
    if let Some(dir) = dir {
        state.storage.remove_dir(&dir).await;
    }

    tracing::info!("User {} deleted artist {}", user.username, id);
    Ok(StatusCode::NO_CONTENT)
}
