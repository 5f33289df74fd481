use actix_web::{HttpResponse, Result, web};
use validator::Validate;

use auth_services::jwt::JwtService;
use auth_services::service::AuthService;
use auth_services::types::*;

/// Handles volunteer registration by validating the request and storing the volunteer.
/// Returns a 201 Created response with the new volunteer's ID.
pub async fn register(
    auth_service: web::Data<AuthService>,
    request: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    let volunteer = auth_service.register(&request).await?;

    Ok(HttpResponse::Created().json(RegisterResponse {
        message: "Volunteer registered".to_string(),
        id: volunteer.id,
    }))
}

/// Handles volunteer login by verifying credentials and issuing an access token.
pub async fn login(
    auth_service: web::Data<AuthService>,
    jwt_service: web::Data<JwtService>,
    request: web::Json<LoginRequest>,
) -> Result<HttpResponse, AuthError> {
    request
        .validate()
        .map_err(|e| AuthError::Validation(format!("Validation error: {}", e)))?;

    let volunteer = auth_service.verify_password(&request).await.inspect_err(|e| {
        if matches!(e, AuthError::InvalidCredentials) {
            log::warn!("🔒 Failed login for {}", request.username);
        }
    })?;

    let access_token = jwt_service.generate_access_token(&volunteer)?;
    log::info!("🔑 Volunteer {} logged in", volunteer.username);

    Ok(HttpResponse::Ok().json(LoginResponse {
        message: "Login successful".to_string(),
        access_token,
        token_type: "Bearer".to_string(),
    }))
}
