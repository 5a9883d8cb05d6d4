use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use serde_json::{Value, json};

use crate::domain::{DomainError, RateableType, UserRole};
use crate::infrastructure::AppState;
use crate::infrastructure::auth::AuthUser;
use crate::models::user::{AccountDto, PublicUser};
use crate::services::account_service::{self, UpdateAccountRequest};

pub async fn get_user(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<Json<Value>, DomainError> {
    let account = account_service::find_user(state.db(), id).await?;

    // Organisers are rated as people
    let rating = if account.role == UserRole::Organiser.as_str() {
        Some(state.rating_repo.summary(RateableType::Organiser, id).await?)
    } else {
        None
    };

    Ok(Json(json!({
        "user": PublicUser::from(account),
        "rating": rating
    })))
}

pub async fn update_me(
    State(state): State<AppState>,
    user: AuthUser,
    Json(payload): Json<UpdateAccountRequest>,
) -> Result<Json<Value>, DomainError> {
    let account = account_service::update_account(state.db(), user.id, payload).await?;
    tracing::info!("User {} updated their account", account.id);
    Ok(Json(json!({ "user": AccountDto::from(account) })))
}

pub async fn delete_me(
    State(state): State<AppState>,
    user: AuthUser,
) -> Result<StatusCode, DomainError> {
    account_service::delete_account(state.db(), &state.storage, user.id).await?;
    Ok(StatusCode::NO_CONTENT)
}
