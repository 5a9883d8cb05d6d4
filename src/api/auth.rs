use axum::{Json, extract::State, http::StatusCode};
use sea_orm::DatabaseConnection;
use serde_json::{Value, json};

use crate::domain::DomainError;
use crate::infrastructure::auth::AuthUser;
use crate::models::user::AccountDto;
use crate::services::account_service::{self, LoginRequest, RegisterRequest};

#[utoipa::path(
    post,
    path = "/api/auth/register",
    responses(
        (status = 201, description = "Account created, token issued"),
        (status = 400, description = "Invalid username, email, password or role"),
        (status = 409, description = "Username or email already in use")
    )
)]
pub async fn register(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<Value>), DomainError> {
    let account = account_service::register(&db, payload).await?;
    let token = account_service::issue_token(&account)?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "token": token,
            "user": AccountDto::from(account)
        })),
    ))
}

#[utoipa::path(
    post,
    path = "/api/auth/login",
    responses(
        (status = 200, description = "Token issued"),
        (status = 401, description = "Invalid credentials")
    )
)]
pub async fn login(
    State(db): State<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<Value>, DomainError> {
    let account = account_service::login(&db, payload).await?;
    let token = account_service::issue_token(&account)?;

    Ok(Json(json!({
        "token": token,
        "user": AccountDto::from(account)
    })))
}

pub async fn get_me(
    State(db): State<DatabaseConnection>,
    user: AuthUser,
) -> Result<Json<Value>, DomainError> {
    let account = account_service::find_user(&db, user.id).await?;
    Ok(Json(json!({ "user": AccountDto::from(account) })))
}
