//! # Auth Services
//!
//! This crate provides the access gate for volunteers.
//! It includes volunteer registration and credential checks, JWT token handling,
//! and middleware that guards protected routes.

/// JWT token handling for authenticated volunteers.
pub mod jwt;
/// Middleware for request authentication.
pub mod middleware;
/// Storage interface for volunteer records.
pub mod repository;
/// Registration and credential verification.
pub mod service;
/// Types and structures used in authentication services.
pub mod types;

pub use service::DEFAULT_BCRYPT_COST;
