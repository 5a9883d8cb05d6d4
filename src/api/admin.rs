//! Back-office dashboard: administrators, paid feature catalogue, purchases and moderation

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use serde::Deserialize;
use serde_json::{Value, json};

use super::features::target_filter;
use crate::domain::{DomainError, PurchaseStatus};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AdminUser;
use crate::services::account_service;
use crate::services::admin_service::{
    self, AdminLoginRequest, CreateMajestyRequest, MajestyDto,
};
use crate::services::feature_service::{self, FeatureRequest, GrantRequest};

#[derive(Debug, Deserialize)]
pub struct PurchaseQuery {
    pub status: Option<String>,
    pub target_type: Option<String>,
}

fn require_owner(admin: &AdminUser) -> Result<(), DomainError> {
    if !admin.is_owner() {
        return Err(DomainError::forbidden("Owner access required"));
    }
    Ok(())
}

pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<AdminLoginRequest>,
) -> Result<Json<Value>, DomainError> {
    let account = admin_service::login(state.db(), payload).await?;
    let token = admin_service::issue_token(&account)?;

    Ok(Json(json!({
        "token": token,
        "admin": MajestyDto::from(account)
    })))
}

// ---------------------------------------------------------------------------
// Administrators (owner only)
// ---------------------------------------------------------------------------

pub async fn list_majesty(
    State(state): State<AppState>,
    admin: AdminUser,
) -> Result<Json<Value>, DomainError> {
    require_owner(&admin)?;
    let accounts = admin_service::list_majesty(state.db()).await?;
    Ok(Json(json!({ "admins": accounts })))
}

pub async fn create_majesty(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<CreateMajestyRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    require_owner(&admin)?;
    let account = admin_service::create_majesty(state.db(), payload).await?;
    Ok((
        StatusCode::CREATED,
        Json(json!({ "admin": MajestyDto::from(account) })),
    ))
}

pub async fn delete_majesty(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    require_owner(&admin)?;
    admin_service::delete_majesty(state.db(), admin.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Paid feature catalogue
// ---------------------------------------------------------------------------

pub async fn list_features(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, DomainError> {
    let features = feature_service::list_features(state.db(), false, None).await?;
    Ok(Json(json!({ "features": features })))
}

pub async fn create_feature(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<FeatureRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let feature = feature_service::create_feature(state.db(), payload).await?;
    tracing::info!("{} created feature {}", admin.username, feature.id);
    Ok((StatusCode::CREATED, Json(json!({ "feature": feature }))))
}

pub async fn update_feature(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
    Json(payload): Json<FeatureRequest>,
) -> Result<Json<Value>, DomainError> {
    let feature = feature_service::update_feature(state.db(), id, payload).await?;
    Ok(Json(json!({ "feature": feature })))
}

pub async fn delete_feature(
    State(state): State<AppState>,
    _admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    feature_service::delete_feature(state.db(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}

// ---------------------------------------------------------------------------
// Purchases
// ---------------------------------------------------------------------------

pub async fn list_purchases(
    State(state): State<AppState>,
    _admin: AdminUser,
    Query(params): Query<PurchaseQuery>,
) -> Result<Json<Value>, DomainError> {
    let status = match params.status.as_deref().map(str::trim) {
        None | Some("") => PurchaseStatus::All,
        Some(raw) => raw.parse()?,
    };
    let target_type = target_filter(params.target_type.as_deref())?;

    let purchases = feature_service::list_purchases(state.db(), status, target_type).await?;
    Ok(Json(json!({
        "total": purchases.len(),
        "purchases": purchases
    })))
}

pub async fn grant_purchase(
    State(state): State<AppState>,
    admin: AdminUser,
    Json(payload): Json<GrantRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let purchase = feature_service::grant(state.db(), payload).await?;
    tracing::info!("{} granted purchase {}", admin.username, purchase.id);
    Ok((StatusCode::CREATED, Json(json!({ "purchase": purchase }))))
}

pub async fn revoke_purchase(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    feature_service::revoke(state.db(), id).await?;
    tracing::info!("{} revoked purchase {}", admin.username, id);
    Ok(StatusCode::NO_CONTENT)
}

pub async fn stats(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, DomainError> {
    let stats = feature_service::stats(state.db()).await?;
    Ok(Json(json!({ "stats": stats })))
}

// ---------------------------------------------------------------------------
// User moderation
// ---------------------------------------------------------------------------

pub async fn list_users(
    State(state): State<AppState>,
    _admin: AdminUser,
) -> Result<Json<Value>, DomainError> {
    let users = admin_service::list_users(state.db()).await?;
    Ok(Json(json!({ "users": users })))
}

pub async fn delete_user(
    State(state): State<AppState>,
    admin: AdminUser,
    Path(id): Path<i32>,
) -> Result<StatusCode, DomainError> {
    account_service::delete_account(state.db(), &state.storage, id).await?;
    tracing::warn!("{} removed user {}", admin.username, id);
    Ok(StatusCode::NO_CONTENT)
}
