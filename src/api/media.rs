//! Multipart image uploads for users, artists, venues and events

use axum::{
    Json,
    extract::{Multipart, Path, State, multipart::MultipartError},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use crate::domain::{DomainError, ListingKind, MediaKind};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AuthUser;
use crate::services::media_service;

#[derive(Debug, Deserialize)]
pub struct RemoveImageRequest {
    pub path: String,
}

fn multipart_error(e: MultipartError) -> DomainError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        DomainError::PayloadTooLarge("Upload exceeds the request size limit".to_string())
    } else {
        DomainError::Validation(format!("Malformed multipart body: {}", e.body_text()))
    }
}

/// Collect the bytes of every part named `file` or `files`
async fn read_files(
    multipart: &mut Multipart,
    max_bytes: usize,
) -> Result<Vec<Vec<u8>>, DomainError> {
    let mut files = Vec::new();

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if !matches!(field.name(), Some("file" | "files")) {
            continue;
        }
        let data = field.bytes().await.map_err(multipart_error)?;
        if data.len() > max_bytes {
            return Err(DomainError::PayloadTooLarge(format!(
                "Images are limited to {} bytes",
                max_bytes
            )));
        }
        files.push(data.to_vec());
    }

    Ok(files)
}

async fn read_single(
    state: &AppState,
    multipart: &mut Multipart,
) -> Result<Vec<u8>, DomainError> {
    let mut files = read_files(multipart, state.storage.max_upload_bytes()).await?;
    match files.len() {
        0 => Err(DomainError::validation("No file uploaded (field 'file')")),
        1 => Ok(files.remove(0)),
        _ => Err(DomainError::validation("Upload exactly one file")),
    }
}

async fn picture(
    state: AppState,
    user: AuthUser,
    kind: MediaKind,
    id: i32,
    mut multipart: Multipart,
) -> Result<Json<Value>, DomainError> {
    let bytes = read_single(&state, &mut multipart).await?;
    let path = media_service::set_profile_picture(
        state.media_repo.as_ref(),
        &state.storage,
        kind,
        id,
        user.id,
        &bytes,
    )
    .await?;

    Ok(Json(json!({ "profile_picture": path })))
}

async fn add_to_gallery(
    state: AppState,
    user: AuthUser,
    kind: ListingKind,
    id: i32,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let files = read_files(&mut multipart, state.storage.max_upload_bytes()).await?;
    let gallery = media_service::add_gallery_images(
        state.media_repo.as_ref(),
        &state.storage,
        kind,
        id,
        user.id,
        &files,
    )
    .await?;

    Ok((StatusCode::CREATED, Json(json!({ "gallery": gallery }))))
}

async fn remove_from_gallery(
    state: AppState,
    user: AuthUser,
    kind: ListingKind,
    id: i32,
    request: RemoveImageRequest,
) -> Result<Json<Value>, DomainError> {
    let gallery = media_service::remove_gallery_image(
        state.media_repo.as_ref(),
        &state.storage,
        kind,
        id,
        user.id,
        &request.path,
    )
    .await?;

    Ok(Json(json!({ "gallery": gallery })))
}

pub async fn user_picture(
    State(state): State<AppState>,
    user: AuthUser,
    multipart: Multipart,
) -> Result<Json<Value>, DomainError> {
    let id = user.id;
    picture(state, user, MediaKind::User, id, multipart).await
}

pub async fn artist_picture(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Value>, DomainError> {
    picture(state, user, ListingKind::Artist.into(), id, multipart).await
}

pub async fn venue_picture(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Value>, DomainError> {
    picture(state, user, ListingKind::Venue.into(), id, multipart).await
}

pub async fn event_picture(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<Json<Value>, DomainError> {
    picture(state, user, ListingKind::Event.into(), id, multipart).await
}

pub async fn artist_gallery_add(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    add_to_gallery(state, user, ListingKind::Artist, id, multipart).await
}

pub async fn venue_gallery_add(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    add_to_gallery(state, user, ListingKind::Venue, id, multipart).await
}

pub async fn event_gallery_add(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    multipart: Multipart,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    add_to_gallery(state, user, ListingKind::Event, id, multipart).await
}

pub async fn artist_gallery_remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(request): Json<RemoveImageRequest>,
) -> Result<Json<Value>, DomainError> {
    remove_from_gallery(state, user, ListingKind::Artist, id, request).await
}

pub async fn venue_gallery_remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(request): Json<RemoveImageRequest>,
) -> Result<Json<Value>, DomainError> {
    remove_from_gallery(state, user, ListingKind::Venue, id, request).await
}

pub async fn event_gallery_remove(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(request): Json<RemoveImageRequest>,
) -> Result<Json<Value>, DomainError> {
    remove_from_gallery(state, user, ListingKind::Event, id, request).await
}
