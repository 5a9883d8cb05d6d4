//! Services Layer
//!
//! This module contains business rules kept out of the HTTP handlers.

pub mod account_service;
pub mod admin_service;
pub mod feature_service;
pub mod media_service;
pub mod rating_service;
