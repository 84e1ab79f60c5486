use actix_web::{web, HttpResponse};
use utoipa::OpenApi;

pub mod auth;
pub mod health;
pub mod messages;
pub mod users;

use crate::middleware::JwtAuth;
use crate::openapi::ApiDoc;

// OpenAPI endpoint handler
async fn openapi_json() -> HttpResponse {
    HttpResponse::Ok()
        .content_type("application/json")
        .json(ApiDoc::openapi())
}

pub fn configure_routes(cfg: &mut web::ServiceConfig) {
    // Service introspection endpoints
    cfg.route("/health", web::get().to(health::health_check))
        .route("/openapi.json", web::get().to(openapi_json));

    // Account endpoints. Registration and login stay open, the listing
    // requires a token.
    cfg.service(
        web::scope("/users")
            .route("/register", web::post().to(auth::register))
            .route("/login", web::post().to(auth::login))
            .service(
                web::resource("")
                    .wrap(JwtAuth)
                    .route(web::get().to(users::list_users)),
            ),
    );

    // Messaging endpoints, all behind JWT auth. Literal segments are
    // registered before the {messageId} patterns so they match first.
    cfg.service(
        web::scope("/messages")
            .wrap(JwtAuth)
            .route("/send", web::post().to(messages::send_message))
            .route("/conversation", web::post().to(messages::conversation))
            .route("/{messageId}/edit", web::post().to(messages::edit_message))
            .route("/{messageId}", web::delete().to(messages::delete_message)),
    );
}
