//! # Ledger Services
//!
//! This crate owns rescue fundraising campaigns and the contributions made to them.
//! A campaign's `collected` amount always equals the sum of its contributions:
//! a contribution and the matching balance increment are stored as one unit.

/// Types and errors for campaigns and contributions.
pub mod types;
/// Storage interface with PostgreSQL and in-memory implementations.
pub mod repository;
/// Validation and orchestration of ledger operations.
pub mod service;

pub use repository::{InMemoryLedgerRepository, LedgerRepository, PgLedgerRepository};
pub use service::LedgerService;
pub use types::*;
