//! # Geocoding
//!
//! This crate turns free-text place descriptions into coordinates.
//! Every lookup ends in a definite [`Resolution`]: either coordinates or an
//! unresolved reason. Callers decide what an unresolved location means for them.

/// Coordinates, resolution outcomes and the resolver trait.
mod types;
pub use types::*;

/// Resolver backed by the Nominatim search API.
mod nominatim;
pub use nominatim::*;

/// Table-driven resolver for tests and offline development.
mod fixed;
pub use fixed::*;
