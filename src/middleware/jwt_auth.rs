/// JWT authentication middleware for Bearer token validation
/// Extracts the caller's user id from the token and adds it to request
/// extensions for handlers to pick up
use actix_web::{
    dev::{forward_ready, Payload, Service, ServiceRequest, ServiceResponse, Transform},
    web, Error, FromRequest, HttpMessage, HttpRequest,
};
use futures::future::{ready, LocalBoxFuture, Ready};
use std::rc::Rc;
use uuid::Uuid;

use crate::error::AppError;
use crate::security::TokenIssuer;

/// The authenticated caller, as established by [`JwtAuth`]. Handlers take
/// this as an extractor and pass it into service operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller(pub Uuid);

/// JWT authentication middleware factory
pub struct JwtAuth;

impl<S, B> Transform<S, ServiceRequest> for JwtAuth
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type InitError = ();
    type Transform = JwtAuthService<S>;
    type Future = std::future::Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        std::future::ready(Ok(JwtAuthService {
            service: Rc::new(service),
        }))
    }
}

pub struct JwtAuthService<S> {
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtAuthService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<B>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = self.service.clone();

        Box::pin(async move {
            // Read headers into owned data before touching extensions_mut;
            // both go through the same RefCell.
            let auth_header = match req.headers().get("Authorization") {
                Some(header) => match header.to_str() {
                    Ok(h) => h.to_string(),
                    Err(_) => {
                        return Err(AppError::Authentication(
                            "Invalid Authorization header".to_string(),
                        )
                        .into());
                    }
                },
                None => {
                    return Err(AppError::Authentication(
                        "Missing Authorization header".to_string(),
                    )
                    .into());
                }
            };

            let token = match auth_header.strip_prefix("Bearer ") {
                Some(t) => t,
                None => {
                    return Err(AppError::Authentication(
                        "Invalid Authorization scheme, expected Bearer".to_string(),
                    )
                    .into());
                }
            };

            let issuer = match req.app_data::<web::Data<TokenIssuer>>() {
                Some(issuer) => issuer.clone(),
                None => {
                    return Err(
                        AppError::Internal("Token issuer not configured".to_string()).into(),
                    );
                }
            };

            let caller = match issuer.validate(token) {
                Ok(claims) => match Uuid::parse_str(&claims.sub) {
                    Ok(id) => id,
                    Err(_) => {
                        return Err(
                            AppError::Authentication("Invalid user ID in token".to_string()).into(),
                        );
                    }
                },
                Err(e) => {
                    tracing::debug!("Token validation failed: {}", e);
                    return Err(
                        AppError::Authentication("Invalid or expired token".to_string()).into(),
                    );
                }
            };

            req.extensions_mut().insert(Caller(caller));

            let res = service.call(req).await?;
            Ok(res)
        })
    }
}

impl FromRequest for Caller {
    type Error = Error;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        match req.extensions().get::<Caller>().copied() {
            Some(caller) => ready(Ok(caller)),
            None => ready(Err(AppError::Authentication(
                "Caller identity missing in request extensions".to_string(),
            )
            .into())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App, HttpResponse, ResponseError};
    use chrono::Utc;

    use crate::config::JwtConfig;
    use crate::models::User;

    async fn whoami(caller: Caller) -> HttpResponse {
        HttpResponse::Ok().body(caller.0.to_string())
    }

    fn issuer() -> TokenIssuer {
        TokenIssuer::new(&JwtConfig {
            secret: "test-secret-at-least-32-chars-long!!".into(),
            issuer: "chat-service".into(),
            expiry_days: 7,
        })
    }

    fn user() -> User {
        User {
            id: Uuid::new_v4(),
            email: "mw@example.com".into(),
            display_name: "mw".into(),
            password_hash: String::new(),
            created_at: Utc::now(),
        }
    }

    #[actix_web::test]
    async fn missing_header_is_rejected() {
        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(issuer()))
                .wrap(JwtAuth)
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let err =
            test::try_call_service(&app, test::TestRequest::get().uri("/whoami").to_request())
                .await
                .unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }

    #[actix_web::test]
    async fn valid_token_passes_caller_through() {
        let issuer = issuer();
        let user = user();
        let token = issuer.issue(&user).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(issuer))
                .wrap(JwtAuth)
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert!(resp.status().is_success());

        let body = test::read_body(resp).await;
        assert_eq!(body, user.id.to_string().as_bytes());
    }

    #[actix_web::test]
    async fn token_from_another_secret_is_rejected() {
        let foreign = TokenIssuer::new(&JwtConfig {
            secret: "some-other-secret-that-is-32-chars!!".into(),
            issuer: "chat-service".into(),
            expiry_days: 7,
        });
        let token = foreign.issue(&user()).unwrap();

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(issuer()))
                .wrap(JwtAuth)
                .route("/whoami", web::get().to(whoami)),
        )
        .await;

        let req = test::TestRequest::get()
            .uri("/whoami")
            .insert_header(("Authorization", format!("Bearer {}", token)))
            .to_request();
        let err = test::try_call_service(&app, req).await.unwrap_err();
        assert_eq!(
            err.as_response_error().status_code(),
            actix_web::http::StatusCode::UNAUTHORIZED
        );
    }
}
