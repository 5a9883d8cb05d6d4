//! Account Service - registration, login and self-service profile changes

use sea_orm::*;
use serde::Deserialize;

use crate::domain::{DomainError, UserRole};
use crate::infrastructure::auth::{create_jwt, hash_password, verify_password};
use crate::infrastructure::storage::MediaStorage;
use crate::models::user::{self, Entity as User};
use crate::utils::time;

pub const MIN_USERNAME_CHARS: usize = 3;
pub const MAX_USERNAME_CHARS: usize = 32;
pub const MIN_PASSWORD_CHARS: usize = 8;
pub const MAX_EMAIL_CHARS: usize = 254;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    /// Username or email
    #[serde(alias = "username", alias = "email")]
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct UpdateAccountRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

pub fn validate_username(raw: &str) -> Result<String, DomainError> {
    let username = raw.trim();
    let len = username.chars().count();
    if !(MIN_USERNAME_CHARS..=MAX_USERNAME_CHARS).contains(&len) {
        return Err(DomainError::Validation(format!(
            "username must be {} to {} characters",
            MIN_USERNAME_CHARS, MAX_USERNAME_CHARS
        )));
    }
    if !username
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'))
    {
        return Err(DomainError::validation(
            "username may only contain letters, digits, '_', '-' and '.'",
        ));
    }
    Ok(username.to_string())
}

pub fn validate_email(raw: &str) -> Result<String, DomainError> {
    let email = raw.trim().to_lowercase();
    let valid = email.chars().count() <= MAX_EMAIL_CHARS
        && !email.chars().any(char::is_whitespace)
        && email
            .split_once('@')
            .is_some_and(|(local, domain)| !local.is_empty() && !domain.is_empty());
    if !valid {
        return Err(DomainError::validation("email address is not valid"));
    }
    Ok(email)
}

pub fn validate_password(password: &str) -> Result<(), DomainError> {
    if password.chars().count() < MIN_PASSWORD_CHARS {
        return Err(DomainError::Validation(format!(
            "password must be at least {} characters",
            MIN_PASSWORD_CHARS
        )));
    }
    Ok(())
}

fn hash(password: &str) -> Result<String, DomainError> {
    hash_password(password).map_err(DomainError::Internal)
}

/// Reject a username or email already used by someone other than `except`
async fn ensure_unique(
    db: &DatabaseConnection,
    username: Option<&str>,
    email: Option<&str>,
    except: Option<i32>,
) -> Result<(), DomainError> {
    if let Some(username) = username {
        let mut query = User::find().filter(user::Column::Username.eq(username));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(DomainError::Conflict("Username is already taken".to_string()));
        }
    }
    if let Some(email) = email {
        let mut query = User::find().filter(user::Column::Email.eq(email));
        if let Some(id) = except {
            query = query.filter(user::Column::Id.ne(id));
        }
        if query.one(db).await?.is_some() {
            return Err(DomainError::Conflict(
                "Email is already registered".to_string(),
            ));
        }
    }
    Ok(())
}

/// Token for a platform user
pub fn issue_token(account: &user::Model) -> Result<String, DomainError> {
    create_jwt(account.id, &account.username, &account.role).map_err(DomainError::Internal)
}

pub async fn register(
    db: &DatabaseConnection,
    request: RegisterRequest,
) -> Result<user::Model, DomainError> {
    let username = validate_username(&request.username)?;
    let email = validate_email(&request.email)?;
    validate_password(&request.password)?;
    let role = match request.role.as_deref().map(str::trim) {
        None | Some("") => UserRole::Fan,
        Some(raw) => raw.parse()?,
    };

    ensure_unique(db, Some(&username), Some(&email), None).await?;

    let now = time::now();
    let account = user::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash(&request.password)?),
        role: Set(role.as_str().to_string()),
        profile_picture: Set(None),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Registered {} '{}'", account.role, account.username);
    Ok(account)
}

pub async fn login(
    db: &DatabaseConnection,
    request: LoginRequest,
) -> Result<user::Model, DomainError> {
    let identifier = request.identifier.trim();
    let invalid = || DomainError::Unauthorized("Invalid credentials".to_string());

    let Some(account) = User::find()
        .filter(
            Condition::any()
                .add(user::Column::Username.eq(identifier))
                .add(user::Column::Email.eq(identifier.to_lowercase())),
        )
        .one(db)
        .await?
    else {
        tracing::warn!("Login attempt for unknown user: {}", identifier);
        return Err(invalid());
    };

    match verify_password(&request.password, &account.password_hash) {
        Ok(true) => {
            tracing::info!("User {} logged in", account.username);
            Ok(account)
        }
        Ok(false) => {
            tracing::warn!("Password verification failed for user: {}", account.username);
            Err(invalid())
        }
        Err(e) => {
            tracing::error!("Stored hash for {} is unreadable: {}", account.username, e);
            Err(invalid())
        }
    }
}

pub async fn find_user(db: &DatabaseConnection, id: i32) -> Result<user::Model, DomainError> {
    User::find_by_id(id)
        .one(db)
        .await?
        .ok_or_else(|| DomainError::not_found("User"))
}

pub async fn update_account(
    db: &DatabaseConnection,
    id: i32,
    request: UpdateAccountRequest,
) -> Result<user::Model, DomainError> {
    let existing = find_user(db, id).await?;

    let username = request.username.as_deref().map(validate_username).transpose()?;
    let email = request.email.as_deref().map(validate_email).transpose()?;
    if let Some(password) = &request.password {
        validate_password(password)?;
    }

    ensure_unique(db, username.as_deref(), email.as_deref(), Some(id)).await?;

    let mut active: user::ActiveModel = existing.into();
    if let Some(username) = username {
        active.username = Set(username);
    }
    if let Some(email) = email {
        active.email = Set(email);
    }
    if let Some(password) = request.password {
        active.password_hash = Set(hash(&password)?);
    }
    active.updated_at = Set(time::now());

    Ok(active.update(db).await?)
}

/// Delete a user, their listings and ratings (by cascade) and their uploads
pub async fn delete_account(
    db: &DatabaseConnection,
    storage: &MediaStorage,
    id: i32,
) -> Result<(), DomainError> {
    let result = User::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::not_found("User"));
    }

    storage.remove_user_folders(id).await;
    tracing::info!("Deleted user {}", id);
    Ok(())
}
