use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use super::listing::PageQuery;
use crate::domain::{DomainError, Page, RateableType};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AuthUser;
use crate::services::rating_service::{self, RatingRequest};

#[utoipa::path(
    post,
    path = "/api/ratings",
    responses(
        (status = 201, description = "Rating created"),
        (status = 200, description = "Existing rating updated"),
        (status = 400, description = "Invalid score, review or type"),
        (status = 403, description = "Rating your own listing"),
        (status = 404, description = "Rated item not found")
    )
)]
pub async fn submit_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<RatingRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let (rating, created) =
        rating_service::submit(state.rating_repo.as_ref(), user.id, payload).await?;
    let status = if created {
        StatusCode::CREATED
    } else {
        StatusCode::OK
    };

    Ok((status, Json(json!({ "rating": rating }))))
}

#[utoipa::path(
    get,
    path = "/api/ratings/{key}/{id}/average",
    params(
        ("key" = String, Path, description = "artist, event, venue or organiser"),
        ("id" = i32, Path, description = "Id of the rated row")
    ),
    responses((status = 200, description = "Average score and rating count"))
)]
pub async fn get_average(
    State(state): State<AppState>,
    Path((rateable_type, rateable_id)): Path<(String, i32)>,
) -> Result<Json<Value>, DomainError> {
    let rateable_type: RateableType = rateable_type.parse()?;
    let summary = rating_service::average(state.rating_repo.as_ref(), rateable_type, rateable_id)
        .await?;

    Ok(Json(json!({
        "rateable_type": rateable_type,
        "rateable_id": rateable_id,
        "average": summary.average,
        "count": summary.count
    })))
}

pub async fn list_ratings(
    State(state): State<AppState>,
    Path((rateable_type, rateable_id)): Path<(String, i32)>,
    Query(params): Query<PageQuery>,
) -> Result<Json<Value>, DomainError> {
    let rateable_type: RateableType = rateable_type.parse()?;
    let result = rating_service::reviews(
        state.rating_repo.as_ref(),
        rateable_type,
        rateable_id,
        Page::from(&params),
    )
    .await?;

    Ok(Json(json!({
        "ratings": result.items,
        "total": result.total
    })))
}

pub async fn my_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path((rateable_type, rateable_id)): Path<(String, i32)>,
) -> Result<Json<Value>, DomainError> {
    let rateable_type: RateableType = rateable_type.parse()?;
    let rating =
        rating_service::mine(state.rating_repo.as_ref(), user.id, rateable_type, rateable_id)
            .await?;

    Ok(Json(json!({ "rating": rating })))
}

pub async fn delete_rating(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    rating_service::remove(state.rating_repo.as_ref(), user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
