//! # Postgres
//!
//! This crate provides the PostgreSQL connection pool and schema for the rescue service.

/// Connection pool and health check.
pub mod database;
pub use database::*;

/// Table definitions created at start-up.
pub mod schema;
pub use schema::ensure_schema;
