use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
/// OpenAPI documentation for the chat service REST endpoints
use utoipa::OpenApi;

use crate::error::ErrorResponse;
use crate::models::message::{
    ConversationRequest, ConversationResponse, DeleteMessageResponse, EditMessageRequest,
    EditMessageResponse, MessageResponse, SendMessageRequest,
};
use crate::models::user::{
    LoginRequest, LoginResponse, RegisterRequest, RegisterResponse, UserProfile, UsersResponse,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Chat Service API",
        version = "0.1.0",
        description = "Direct messaging backend: account registration and login, JWT-authenticated message CRUD, and conversation history"
    ),
    servers(
        (url = "http://localhost:8080", description = "Development server"),
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::users::list_users,
        crate::handlers::messages::send_message,
        crate::handlers::messages::edit_message,
        crate::handlers::messages::delete_message,
        crate::handlers::messages::conversation
    ),
    components(schemas(
        RegisterRequest,
        LoginRequest,
        SendMessageRequest,
        EditMessageRequest,
        ConversationRequest,
        RegisterResponse,
        LoginResponse,
        UserProfile,
        UsersResponse,
        MessageResponse,
        EditMessageResponse,
        DeleteMessageResponse,
        ConversationResponse,
        ErrorResponse
    )),
    tags(
        (name = "Users", description = "Account registration, login, and user directory"),
        (name = "Messages", description = "Direct message CRUD and conversation history")
    ),
    modifiers(&SecurityAddon),
)]
pub struct ApiDoc;

struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            )
        }
    }
}
