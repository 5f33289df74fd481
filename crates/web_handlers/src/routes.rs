use actix_web::{HttpResponse, error, middleware::Condition, web};

use auth_services::{jwt::JwtService, middleware::AuthMiddleware};

use crate::*;

/// Registers every route. When `protect_campaign_writes` is set, creating a
/// campaign requires a bearer token issued by `jwt_service`.
pub fn configure(
    cfg: &mut web::ServiceConfig,
    jwt_service: JwtService,
    protect_campaign_writes: bool,
) {
    let json_config = web::JsonConfig::default().error_handler(|err, _req| {
        let response = HttpResponse::BadRequest().json(serde_json::json!({
            "error": "validation_error",
            "message": err.to_string()
        }));
        error::InternalError::from_response(err, response).into()
    });

    cfg.app_data(json_config)
        .route("/", web::get().to(home))
        .route("/health", web::get().to(health))
        .route("/cagnottes", web::get().to(list_campaigns))
        .service(
            web::resource("/cagnotte")
                .wrap(Condition::new(
                    protect_campaign_writes,
                    AuthMiddleware::new(jwt_service),
                ))
                .route(web::post().to(create_campaign)),
        )
        .route("/cagnotte/{id}", web::get().to(get_campaign))
        .route("/contribution", web::post().to(contribute))
        .route("/urgence", web::post().to(report_emergency))
        .route("/urgences", web::get().to(list_emergencies))
        .route("/register", web::post().to(register))
        .route("/login", web::post().to(login))
        .route("/ws", web::get().to(chat_socket));
}
