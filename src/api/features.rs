//! Public catalogue, purchases and the featured spotlight

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use sea_orm::DatabaseConnection;
use serde::Deserialize;
use serde_json::{Value, json};
use utoipa::IntoParams;

use crate::domain::{DomainError, ListingKind};
use crate::infrastructure::auth::AuthUser;
use crate::services::feature_service;

#[derive(Debug, Deserialize)]
pub struct CatalogueQuery {
    pub target_type: Option<String>,
}

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct FeaturedQuery {
    /// artist, venue or event
    pub target_type: Option<String>,
    /// Maximum entries
    pub limit: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct PurchaseRequest {
    pub target_id: i32,
}

/// Parse an optional `target_type` query value; blank means no filter
pub(crate) fn target_filter(raw: Option<&str>) -> Result<Option<ListingKind>, DomainError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(raw) => raw.parse().map(Some),
    }
}

pub async fn list_features(
    State(db): State<DatabaseConnection>,
    Query(params): Query<CatalogueQuery>,
) -> Result<Json<Value>, DomainError> {
    let target_type = target_filter(params.target_type.as_deref())?;
    let features = feature_service::list_features(&db, true, target_type).await?;
    Ok(Json(json!({ "features": features })))
}

pub async fn purchase_feature(
    State(db): State<DatabaseConnection>,
    user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<PurchaseRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let purchase = feature_service::purchase(&db, user.id, id, payload.target_id).await?;
    Ok((StatusCode::CREATED, Json(json!({ "purchase": purchase }))))
}

pub async fn my_purchases(
    State(db): State<DatabaseConnection>,
    user: AuthUser,
) -> Result<Json<Value>, DomainError> {
    let purchases = feature_service::purchases_for_user(&db, user.id).await?;
    Ok(Json(json!({ "purchases": purchases })))
}

#[utoipa::path(
    get,
    path = "/api/featured",
    params(FeaturedQuery),
    responses((status = 200, description = "Listings with a running paid placement"))
)]
pub async fn featured(
    State(db): State<DatabaseConnection>,
    Query(params): Query<FeaturedQuery>,
) -> Result<Json<Value>, DomainError> {
    let target_type = target_filter(params.target_type.as_deref())?;
    let listings = feature_service::featured(&db, target_type, params.limit).await?;
    Ok(Json(json!({ "featured": listings })))
}
