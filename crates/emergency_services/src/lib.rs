//! # Emergency Services
//!
//! This crate records animal-rescue emergencies reported by volunteers.
//! Each report's location is geocoded once, at intake; what happens when the
//! location cannot be resolved is governed by a [`GeocodePolicy`].

/// Types and errors for emergency reports.
pub mod types;
/// Storage interface with PostgreSQL and in-memory implementations.
pub mod repository;
/// Intake of new reports.
pub mod service;

pub use repository::{EmergencyRepository, InMemoryEmergencyRepository, PgEmergencyRepository};
pub use service::EmergencyService;
pub use types::*;
