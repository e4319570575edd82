//! Business logic layer.

pub mod auth_service;
pub mod token_service;
