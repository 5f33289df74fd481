use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use geocoding::Coordinates;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Identifier of an emergency, assigned in creation order
pub type EmergencyId = i64;

/// Request structure for reporting an emergency
#[derive(Debug, Deserialize, Validate)]
pub struct ReportEmergencyRequest {
    /// Name the reporter gave the incident
    #[validate(length(min = 1, max = 100, message = "Name is required"))]
    pub name: String,

    /// Free-text address or place description
    #[validate(length(min = 1, max = 200, message = "Location is required"))]
    pub location: String,

    /// Animal involved
    #[validate(length(min = 1, max = 100, message = "Animal is required"))]
    pub animal: String,

    /// What is happening
    #[validate(length(min = 1, message = "Description is required"))]
    pub description: String,
}

/// Lifecycle state of an emergency. Intake only ever produces `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmergencyStatus {
    /// Reported and waiting for a rescuer
    Pending,
}

impl EmergencyStatus {
    /// Storage representation of the status
    pub fn as_str(&self) -> &'static str {
        match self {
            EmergencyStatus::Pending => "pending",
        }
    }
}

impl fmt::Display for EmergencyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored status string that no variant matches
#[derive(Debug, thiserror::Error)]
#[error("Unknown emergency status: {0}")]
pub struct UnknownStatus(pub String);

impl FromStr for EmergencyStatus {
    type Err = UnknownStatus;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(EmergencyStatus::Pending),
            other => Err(UnknownStatus(other.to_string())),
        }
    }
}

/// A reported emergency as stored.
///
/// Coordinates are held as one optional pair, so latitude and longitude are
/// always both present or both absent.
#[derive(Debug, Clone, Serialize)]
#[serde(into = "EmergencyView")]
pub struct Emergency {
    /// Unique identifier for the emergency
    pub id: EmergencyId,
    /// Name the reporter gave the incident
    pub name: String,
    /// Location as typed by the reporter
    pub location: String,
    /// Geocoded position, if the location could be resolved
    pub coordinates: Option<Coordinates>,
    /// Animal involved
    pub animal: String,
    /// What is happening
    pub description: String,
    /// Current status
    pub status: EmergencyStatus,
    /// When the report was received
    pub reported_at: DateTime<Utc>,
}

/// Wire shape of an emergency with flat `lat`/`lon` fields
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EmergencyView {
    /// Unique identifier for the emergency
    pub id: EmergencyId,
    /// Name the reporter gave the incident
    pub name: String,
    /// Location as typed by the reporter
    pub location: String,
    /// Latitude, null when the location was not resolved
    pub lat: Option<f64>,
    /// Longitude, null when the location was not resolved
    pub lon: Option<f64>,
    /// Animal involved
    pub animal: String,
    /// What is happening
    pub description: String,
    /// Current status
    pub status: EmergencyStatus,
    /// When the report was received
    pub reported_at: DateTime<Utc>,
}

impl From<Emergency> for EmergencyView {
    fn from(emergency: Emergency) -> Self {
        Self {
            id: emergency.id,
            name: emergency.name,
            location: emergency.location,
            lat: emergency.coordinates.map(|c| c.latitude),
            lon: emergency.coordinates.map(|c| c.longitude),
            animal: emergency.animal,
            description: emergency.description,
            status: emergency.status,
            reported_at: emergency.reported_at,
        }
    }
}

/// Validated report ready to be stored
#[derive(Debug, Clone)]
pub struct NewEmergency {
    /// Trimmed incident name
    pub name: String,
    /// Trimmed location text
    pub location: String,
    /// Result of geocoding `location`
    pub coordinates: Option<Coordinates>,
    /// Trimmed animal
    pub animal: String,
    /// Trimmed description
    pub description: String,
}

/// What to do with a report whose location cannot be geocoded
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum GeocodePolicy {
    /// Store the report with null coordinates
    #[default]
    Lenient,
    /// Reject the report
    Strict,
}

impl FromStr for GeocodePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lenient" => Ok(GeocodePolicy::Lenient),
            "strict" => Ok(GeocodePolicy::Strict),
            other => Err(format!(
                "Unknown geocode policy '{}', expected 'lenient' or 'strict'",
                other
            )),
        }
    }
}

/// Response structure for a stored report
#[derive(Debug, Serialize)]
pub struct ReportEmergencyResponse {
    /// Human-readable outcome
    pub message: String,
    /// Identifier of the new emergency
    pub id: EmergencyId,
    /// Whether coordinates were attached
    pub geocoded: bool,
}

/// Custom error type for emergency operations
#[derive(Debug, thiserror::Error)]
pub enum EmergencyError {
    /// A required field is missing or empty
    #[error("Validation error: {0}")]
    Validation(String),

    /// The location could not be geocoded and the policy is strict
    #[error("Location '{location}' could not be resolved: {reason}")]
    UnresolvedLocation {
        /// Location as given
        location: String,
        /// Why the lookup failed
        reason: String,
    },

    /// The backing store failed
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl actix_web::ResponseError for EmergencyError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            EmergencyError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            EmergencyError::UnresolvedLocation { location, .. } => {
                HttpResponse::BadRequest().json(serde_json::json!({
                    "error": "unresolved_location",
                    "message": format!("Could not find location '{}'", location)
                }))
            }
            EmergencyError::Database(_) => {
                HttpResponse::InternalServerError().json(serde_json::json!({
                    "error": "internal_error",
                    "message": "An internal error occurred"
                }))
            }
        }
    }
}
