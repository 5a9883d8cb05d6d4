use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::env;

use axum::{
    async_trait,
    extract::{FromRequestParts, Json},
    http::{StatusCode, request::Parts},
};
use serde_json::json;

use crate::domain::{MajestyRole, UserRole};

pub const TOKEN_TTL_HOURS: i64 = 24;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String, // username
    pub uid: i32,    // users.id or majesty.id depending on role
    pub role: String,
    pub exp: usize,
}

type Rejection = (StatusCode, Json<serde_json::Value>);

fn reject(status: StatusCode, msg: &str) -> Rejection {
    (status, Json(json!({ "error": msg })))
}

#[async_trait]
impl<S> FromRequestParts<S> for Claims
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get("Authorization")
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| reject(StatusCode::UNAUTHORIZED, "Missing Authorization header"))?;

        let Some(token) = auth_header.strip_prefix("Bearer ") else {
            return Err(reject(
                StatusCode::UNAUTHORIZED,
                "Invalid Authorization header format",
            ));
        };

        decode_jwt(token).map_err(|e| {
            tracing::debug!("Rejected token: {}", e);
            reject(StatusCode::UNAUTHORIZED, "Invalid or expired token")
        })
    }
}

/// A platform user (fan, artist, organiser, venue) authenticated by bearer token
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub id: i32,
    pub username: String,
    pub role: UserRole,
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;
        let role = claims
            .role
            .parse::<UserRole>()
            .map_err(|_| reject(StatusCode::FORBIDDEN, "This action requires a user account"))?;

        Ok(AuthUser {
            id: claims.uid,
            username: claims.sub,
            role,
        })
    }
}

/// A back-office account authenticated by bearer token
#[derive(Debug, Clone)]
pub struct AdminUser {
    pub id: i32,
    pub username: String,
    pub role: MajestyRole,
}

impl AdminUser {
    pub fn is_owner(&self) -> bool {
        self.role == MajestyRole::Owner
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for AdminUser
where
    S: Send + Sync,
{
    type Rejection = Rejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let claims = Claims::from_request_parts(parts, state).await?;
        let role = claims
            .role
            .parse::<MajestyRole>()
            .map_err(|_| reject(StatusCode::FORBIDDEN, "Administrator access required"))?;

        Ok(AdminUser {
            id: claims.uid,
            username: claims.sub,
            role,
        })
    }
}

pub fn hash_password(password: &str) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| e.to_string())?
        .to_string();
    Ok(password_hash)
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool, String> {
    let parsed_hash = PasswordHash::new(password_hash).map_err(|e| e.to_string())?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

fn get_jwt_secret() -> Result<String, String> {
    match env::var("JWT_SECRET") {
        Ok(secret) if !secret.is_empty() => Ok(secret),
        _ if cfg!(debug_assertions) => Ok("secret".to_string()),
        _ => Err("JWT_SECRET environment variable must be set in production".to_string()),
    }
}

pub fn create_jwt(uid: i32, username: &str, role: &str) -> Result<String, String> {
    let secret = get_jwt_secret()?;
    let expiration = Utc::now()
        .checked_add_signed(Duration::hours(TOKEN_TTL_HOURS))
        .ok_or_else(|| "token expiry overflow".to_string())?
        .timestamp();

    let claims = Claims {
        sub: username.to_owned(),
        uid,
        role: role.to_owned(),
        exp: expiration as usize,
    };

    encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| e.to_string())
}

pub fn decode_jwt(token: &str) -> Result<Claims, String> {
    let secret = get_jwt_secret()?;
    decode::<Claims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    async fn extract<T>(header: Option<String>) -> Result<T, StatusCode>
    where
        T: FromRequestParts<(), Rejection = Rejection>,
    {
        let mut builder = Request::builder().uri("/");
        if let Some(value) = header {
            builder = builder.header("Authorization", value);
        }
        let (mut parts, _) = builder.body(()).unwrap().into_parts();
        T::from_request_parts(&mut parts, &()).await.map_err(|(s, _)| s)
    }

    #[tokio::test]
    async fn user_token_is_not_an_admin_token() {
        let token = create_jwt(7, "ana", "artist").unwrap();
        let user = extract::<AuthUser>(Some(format!("Bearer {}", token)))
            .await
            .unwrap();
        assert_eq!(user.id, 7);
        assert_eq!(user.role, UserRole::Artist);

        let status = extract::<AdminUser>(Some(format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn admin_token_is_not_a_user_token() {
        let token = create_jwt(1, "root", "owner").unwrap();
        let admin = extract::<AdminUser>(Some(format!("Bearer {}", token)))
            .await
            .unwrap();
        assert!(admin.is_owner());

        let status = extract::<AuthUser>(Some(format!("Bearer {}", token)))
            .await
            .unwrap_err();
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn missing_or_malformed_headers_are_unauthorized() {
        assert_eq!(
            extract::<Claims>(None).await.unwrap_err(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            extract::<Claims>(Some("Token abc".to_string()))
                .await
                .unwrap_err(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            extract::<Claims>(Some("Bearer not-a-jwt".to_string()))
                .await
                .unwrap_err(),
            StatusCode::UNAUTHORIZED
        );
    }
}
