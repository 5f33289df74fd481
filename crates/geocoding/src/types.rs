use std::fmt;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A latitude/longitude pair in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    /// Latitude in decimal degrees
    pub latitude: f64,
    /// Longitude in decimal degrees
    pub longitude: f64,
}

impl Coordinates {
    /// Creates a coordinate pair.
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Why a lookup produced no coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnresolvedReason {
    /// The query was empty after trimming
    EmptyQuery,
    /// The upstream service answered but had no match
    NoMatch,
    /// The lookup did not finish within the configured bound
    Timeout,
    /// The upstream service refused the request because of rate limiting
    RateLimited,
    /// The upstream service was unreachable or answered with an error status
    Upstream(String),
    /// The upstream answer could not be understood
    Malformed(String),
}

impl fmt::Display for UnresolvedReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnresolvedReason::EmptyQuery => write!(f, "empty query"),
            UnresolvedReason::NoMatch => write!(f, "no match"),
            UnresolvedReason::Timeout => write!(f, "lookup timed out"),
            UnresolvedReason::RateLimited => write!(f, "rate limited by geocoder"),
            UnresolvedReason::Upstream(msg) => write!(f, "geocoder unavailable: {}", msg),
            UnresolvedReason::Malformed(msg) => write!(f, "malformed geocoder response: {}", msg),
        }
    }
}

/// Outcome of a single lookup.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The location was resolved
    Resolved(Coordinates),
    /// The location could not be resolved
    Unresolved(UnresolvedReason),
}

impl Resolution {
    /// Returns the coordinates if the lookup succeeded.
    pub fn coordinates(&self) -> Option<Coordinates> {
        match self {
            Resolution::Resolved(coordinates) => Some(*coordinates),
            Resolution::Unresolved(_) => None,
        }
    }
}

/// Turns free text into coordinates.
///
/// Implementations never fail: transport errors, timeouts and empty answers
/// all come back as [`Resolution::Unresolved`]. Each call is independent; no
/// caching or retry happens at this layer.
#[async_trait]
pub trait GeocodeResolver: Send + Sync {
    /// Resolves `location` to coordinates.
    async fn resolve(&self, location: &str) -> Resolution;
}

/// Errors raised while constructing a resolver.
#[derive(Debug, thiserror::Error)]
pub enum GeocodeError {
    /// The HTTP client could not be built
    #[error("Failed to create HTTP client: {0}")]
    Client(String),
}
