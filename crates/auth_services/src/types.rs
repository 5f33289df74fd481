use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

/// Identifier of a volunteer, assigned in registration order
pub type VolunteerId = i64;

/// Request structure for volunteer registration
#[derive(Debug, Deserialize, Validate)]
pub struct RegisterRequest {
    /// Unique username
    #[validate(length(min = 1, max = 150, message = "Username is required"))]
    pub username: String,

    /// Password for the volunteer account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Request structure for volunteer login
#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username of the volunteer
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,

    /// Password for the volunteer account
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Response structure for volunteer registration
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    /// Human-readable outcome
    pub message: String,
    /// Identifier of the new volunteer
    pub id: VolunteerId,
}

/// Response structure for volunteer authentication
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Human-readable outcome
    pub message: String,
    /// Access token for the volunteer
    pub access_token: String,
    /// Always "Bearer"
    pub token_type: String,
}

/// Volunteer record as stored
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Volunteer {
    /// Unique identifier for the volunteer
    pub id: VolunteerId,
    /// Unique username
    pub username: String,
    /// bcrypt hash of the password
    pub password_hash: String,
    /// Timestamp when the volunteer registered
    pub created_at: DateTime<Utc>,
}

/// JWT claims structure
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject of the token, the volunteer ID
    pub sub: String,
    /// Username of the volunteer
    pub username: String,
    /// Expiration timestamp of the token
    pub exp: usize,
    /// Issued at timestamp of the token
    pub iat: usize,
}

/// Custom error type for authentication-related errors
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// The username is already registered
    #[error("Username already exists")]
    UsernameTaken,

    /// The provided credentials are invalid
    #[error("Invalid credentials")]
    InvalidCredentials,

    /// An internal server error occurred
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// An error occurred while hashing the password
    #[error("Password hashing error: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),

    /// An error occurred while creating or reading a token
    #[error("JWT error: {0}")]
    Jwt(#[from] jsonwebtoken::errors::Error),

    /// An error occurred while validating input data
    #[error("Validation error: {0}")]
    Validation(String),
}

impl actix_web::ResponseError for AuthError {
    fn error_response(&self) -> actix_web::HttpResponse {
        use actix_web::HttpResponse;

        match self {
            AuthError::UsernameTaken => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "username_taken",
                "message": "A volunteer with this username already exists"
            })),
            AuthError::InvalidCredentials => HttpResponse::Unauthorized().json(serde_json::json!({
                "error": "invalid_credentials",
                "message": "Invalid username or password"
            })),
            AuthError::Validation(msg) => HttpResponse::BadRequest().json(serde_json::json!({
                "error": "validation_error",
                "message": msg
            })),
            _ => HttpResponse::InternalServerError().json(serde_json::json!({
                "error": "internal_error",
                "message": "An internal error occurred"
            })),
        }
    }
}
