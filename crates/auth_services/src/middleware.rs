use actix_web::{
    Error, HttpMessage, HttpResponse, Result,
    body::EitherBody,
    dev::{Service, ServiceRequest, ServiceResponse, Transform, forward_ready},
};
use futures_util::future::LocalBoxFuture;
use std::{
    future::{Ready, ready},
    rc::Rc,
};

use crate::jwt::JwtService;
use crate::types::VolunteerId;

/// Middleware for handling authentication by verifying JWT tokens
/// and attaching the volunteer ID to the request.
#[derive(Clone)]
pub struct AuthMiddleware {
    jwt_service: JwtService,
}

impl AuthMiddleware {
    /// Creates the middleware around the service that verifies tokens.
    pub fn new(jwt_service: JwtService) -> Self {
        Self { jwt_service }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AuthMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type InitError = ();
    type Transform = AuthMiddlewareService<S>;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(AuthMiddlewareService {
            service: Rc::new(service),
            jwt_service: self.jwt_service.clone(),
        }))
    }
}

/// Service that implements the authentication middleware logic
pub struct AuthMiddlewareService<S> {
    service: Rc<S>,
    jwt_service: JwtService,
}

impl<S, B> Service<ServiceRequest> for AuthMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();
        let jwt_service = self.jwt_service.clone();

        Box::pin(async move {
            let token = req
                .headers()
                .get("Authorization")
                .and_then(|h| h.to_str().ok())
                .and_then(|h| h.strip_prefix("Bearer "));

            let token = match token {
                Some(token) => token,
                None => {
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "missing_token",
                        "message": "Authorization token is required"
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            let volunteer_id = match jwt_service.extract_volunteer_id_from_token(token) {
                Ok(volunteer_id) => volunteer_id,
                Err(e) => {
                    log::debug!("Rejected token: {}", e);
                    let response = HttpResponse::Unauthorized().json(serde_json::json!({
                        "error": "invalid_token",
                        "message": "Invalid or expired token"
                    }));
                    return Ok(req.into_response(response).map_into_right_body());
                }
            };

            req.extensions_mut().insert(AuthenticatedVolunteer(volunteer_id));

            let res = service.call(req).await?;
            Ok(res.map_into_left_body())
        })
    }
}

/// Extractor for the volunteer attached by [`AuthMiddleware`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthenticatedVolunteer(pub VolunteerId);

impl actix_web::FromRequest for AuthenticatedVolunteer {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &actix_web::HttpRequest, _: &mut actix_web::dev::Payload) -> Self::Future {
        let volunteer = req.extensions().get::<AuthenticatedVolunteer>().copied();

        ready(volunteer.ok_or_else(|| {
            actix_web::error::ErrorUnauthorized("Volunteer not authenticated")
        }))
    }
}

#[cfg(test)]
mod tests {
    use actix_web::{App, HttpResponse, http::StatusCode, test, web};
    use chrono::Utc;

    use super::*;
    use crate::types::Volunteer;

    async fn whoami(volunteer: AuthenticatedVolunteer) -> HttpResponse {
        HttpResponse::Ok().body(volunteer.0.to_string())
    }

    async fn maybe_whoami(volunteer: Option<AuthenticatedVolunteer>) -> HttpResponse {
        match volunteer {
            Some(AuthenticatedVolunteer(id)) => HttpResponse::Ok().body(id.to_string()),
            None => HttpResponse::Ok().body("anonymous"),
        }
    }

    #[actix_web::test]
    async fn test_extractor_sees_volunteer_from_token() {
        let jwt = JwtService::new("test-secret");
        let token = jwt
            .generate_access_token(&Volunteer {
                id: 42,
                username: "marie".to_string(),
                password_hash: String::new(),
                created_at: Utc::now(),
            })
            .unwrap();

        let app = test::init_service(
            App::new()
                .service(
                    web::resource("/me")
                        .wrap(AuthMiddleware::new(jwt))
                        .route(web::get().to(whoami)),
                )
                .route("/open", web::get().to(maybe_whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "42");

        let req = test::TestRequest::get()
            .uri("/me")
            .insert_header(("Authorization", "Bearer nope"))
            .to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        let req = test::TestRequest::get().uri("/me").to_request();
        assert_eq!(
            test::call_service(&app, req).await.status(),
            StatusCode::UNAUTHORIZED
        );

        // Outside the middleware the optional extractor stays empty
        let req = test::TestRequest::get().uri("/open").to_request();
        assert_eq!(test::call_and_read_body(&app, req).await, "anonymous");
    }
}
