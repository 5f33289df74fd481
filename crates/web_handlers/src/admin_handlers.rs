use actix_web::{HttpResponse, Result};

/// Welcome text served at the root
pub async fn home() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok()
        .content_type("text/plain; charset=utf-8")
        .body("Welcome to the animal rescue API"))
}

/// Liveness probe
pub async fn health() -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().body("OK"))
}
