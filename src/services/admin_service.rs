//! Admin Service - back-office (`majesty`) accounts and user moderation

use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::domain::{DomainError, MajestyRole};
use crate::infrastructure::auth::{create_jwt, hash_password, verify_password};
use crate::models::majesty::{self, Entity as Majesty};
use crate::models::user::{self, AccountDto, Entity as User};
use crate::services::account_service::{validate_email, validate_password, validate_username};
use crate::utils::time;

#[derive(Debug, Deserialize)]
pub struct AdminLoginRequest {
    pub username: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct CreateMajestyRequest {
    pub username: String,
    pub password: String,
    pub email: Option<String>,
    pub role: Option<String>,
}

/// Back-office account as returned to administrators
#[derive(Debug, Clone, Serialize)]
pub struct MajestyDto {
    pub id: i32,
    pub username: String,
    pub email: Option<String>,
    pub role: String,
    pub created_at: String,
}

impl From<majesty::Model> for MajestyDto {
    fn from(model: majesty::Model) -> Self {
        Self {
            id: model.id,
            username: model.username,
            email: model.email,
            role: model.role,
            created_at: model.created_at,
        }
    }
}

pub fn issue_token(account: &majesty::Model) -> Result<String, DomainError> {
    create_jwt(account.id, &account.username, &account.role).map_err(DomainError::Internal)
}

pub async fn login(
    db: &DatabaseConnection,
    request: AdminLoginRequest,
) -> Result<majesty::Model, DomainError> {
    let invalid = || DomainError::Unauthorized("Invalid credentials".to_string());

    let Some(account) = Majesty::find()
        .filter(majesty::Column::Username.eq(request.username.trim()))
        .one(db)
        .await?
    else {
        tracing::warn!("Admin login attempt for unknown account: {}", request.username);
        return Err(invalid());
    };

    match verify_password(&request.password, &account.password_hash) {
        Ok(true) => {
            tracing::info!("Administrator {} logged in", account.username);
            Ok(account)
        }
        _ => {
            tracing::warn!("Admin password verification failed for: {}", account.username);
            Err(invalid())
        }
    }
}

pub async fn list_majesty(db: &DatabaseConnection) -> Result<Vec<MajestyDto>, DomainError> {
    Ok(Majesty::find()
        .order_by_asc(majesty::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(MajestyDto::from)
        .collect())
}

pub async fn create_majesty(
    db: &DatabaseConnection,
    request: CreateMajestyRequest,
) -> Result<majesty::Model, DomainError> {
    let username = validate_username(&request.username)?;
    validate_password(&request.password)?;
    let email = match request.email.as_deref().map(str::trim) {
        None | Some("") => None,
        Some(raw) => Some(validate_email(raw)?),
    };
    let role = match request.role.as_deref().map(str::trim) {
        None | Some("") => MajestyRole::Admin,
        Some(raw) => raw.parse()?,
    };

    if Majesty::find()
        .filter(majesty::Column::Username.eq(&*username))
        .one(db)
        .await?
        .is_some()
    {
        return Err(DomainError::Conflict(
            "An administrator with this username already exists".to_string(),
        ));
    }

    let now = time::now();
    let account = majesty::ActiveModel {
        username: Set(username),
        email: Set(email),
        password_hash: Set(hash_password(&request.password).map_err(DomainError::Internal)?),
        role: Set(role.as_str().to_string()),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await?;

    tracing::info!("Created {} account '{}'", account.role, account.username);
    Ok(account)
}

pub async fn delete_majesty(
    db: &DatabaseConnection,
    caller_id: i32,
    id: i32,
) -> Result<(), DomainError> {
    if caller_id == id {
        return Err(DomainError::validation("You cannot delete your own account"));
    }

    let result = Majesty::delete_by_id(id).exec(db).await?;
    if result.rows_affected == 0 {
        return Err(DomainError::not_found("Administrator"));
    }
    tracing::info!("Deleted administrator {}", id);
    Ok(())
}

/// Create the first owner account when none exists.
/// Returns true when an account was created.
pub async fn ensure_owner(
    db: &DatabaseConnection,
    username: &str,
    password: &str,
) -> Result<bool, DomainError> {
    let owners = Majesty::find()
        .filter(majesty::Column::Role.eq(MajestyRole::Owner.as_str()))
        .count(db)
        .await?;
    if owners > 0 {
        return Ok(false);
    }

    create_majesty(
        db,
        CreateMajestyRequest {
            username: username.to_string(),
            password: password.to_string(),
            email: None,
            role: Some(MajestyRole::Owner.as_str().to_string()),
        },
    )
    .await?;
    Ok(true)
}

pub async fn list_users(db: &DatabaseConnection) -> Result<Vec<AccountDto>, DomainError> {
    Ok(User::find()
        .order_by_asc(user::Column::Id)
        .all(db)
        .await?
        .into_iter()
        .map(AccountDto::from)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::db;

    #[tokio::test]
    async fn owner_is_bootstrapped_once() {
        let db = db::init_db("sqlite::memory:").await.unwrap();

        assert!(ensure_owner(&db, "root", "correct-horse").await.unwrap());
        assert!(!ensure_owner(&db, "root2", "correct-horse").await.unwrap());

        let accounts = list_majesty(&db).await.unwrap();
        assert_eq!(accounts.len(), 1);
        assert_eq!(accounts[0].role, "owner");

        let owner = login(
            &db,
            AdminLoginRequest {
                username: "root".to_string(),
                password: "correct-horse".to_string(),
            },
        )
        .await
        .unwrap();
        assert!(matches!(
            delete_majesty(&db, owner.id, owner.id).await.unwrap_err(),
            DomainError::Validation(_)
        ));
    }

    #[tokio::test]
    async fn wrong_password_is_unauthorized() {
        let db = db::init_db("sqlite::memory:").await.unwrap();
        ensure_owner(&db, "root", "correct-horse").await.unwrap();

        let err = login(
            &db,
            AdminLoginRequest {
                username: "root".to_string(),
                password: "battery-staple".to_string(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, DomainError::Unauthorized(_)));
    }
}
