//! Domain error types
//!
//! These errors are framework-agnostic and represent business-level failures.

use std::fmt;

#[derive(Debug)]
pub enum DomainError {
    /// Resource not found
    NotFound(String),
    /// Validation error with message
    Validation(String),
    /// Unique constraint or state conflict
    Conflict(String),
    /// Missing or bad credentials
    Unauthorized(String),
    /// Authenticated but not allowed to touch this resource
    Forbidden(String),
    /// Upload larger than the configured limit
    PayloadTooLarge(String),
    /// Database/persistence error
    Database(String),
    /// Upload storage (filesystem) error
    Storage(String),
    /// Generic internal error
    Internal(String),
}

impl DomainError {
    pub fn not_found(what: &str) -> Self {
        DomainError::NotFound(format!("{} not found", what))
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        DomainError::Validation(msg.into())
    }

    pub fn forbidden(msg: impl Into<String>) -> Self {
        DomainError::Forbidden(msg.into())
    }
}

impl fmt::Display for DomainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DomainError::NotFound(msg) => write!(f, "{}", msg),
            DomainError::Validation(msg) => write!(f, "Validation error: {}", msg),
            DomainError::Conflict(msg) => write!(f, "Conflict: {}", msg),
            DomainError::Unauthorized(msg) => write!(f, "Unauthorized: {}", msg),
            DomainError::Forbidden(msg) => write!(f, "Forbidden: {}", msg),
            DomainError::PayloadTooLarge(msg) => write!(f, "Payload too large: {}", msg),
            DomainError::Database(msg) => write!(f, "Database error: {}", msg),
            DomainError::Storage(msg) => write!(f, "Storage error: {}", msg),
            DomainError::Internal(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for DomainError {}

// Conversion from SeaORM errors (used in infrastructure layer)
impl From<sea_orm::DbErr> for DomainError {
    fn from(e: sea_orm::DbErr) -> Self {
        let msg = e.to_string();
        // SQLite reports unique violations as plain text through sqlx
        if msg.contains("UNIQUE constraint failed") {
            return DomainError::Conflict(msg);
        }
        // A parent row removed after the caller looked it up, e.g. a token
        // still in use after its account was deleted
        if msg.contains("FOREIGN KEY constraint failed") {
            tracing::warn!("{}", msg);
            return DomainError::not_found("Referenced record");
        }
        DomainError::Database(msg)
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::Storage(e.to_string())
    }
}
