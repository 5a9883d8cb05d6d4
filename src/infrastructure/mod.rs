//! Infrastructure layer - Framework implementations
//!
//! This layer contains:
//! - Database connection and migrations (db)
//! - HTTP server setup (server)
//! - Configuration loading (config)
//! - Authentication (auth)
//! - Upload storage on disk (storage)
//! - Repository implementations (repositories)
//! - Application state (state)
//! - Demo data (seed)

pub mod auth;
pub mod config;
pub mod db;
pub mod repositories;
pub mod seed;
pub mod server;
pub mod state;
pub mod storage;

pub use repositories::*;
pub use state::AppState;
