/// User directory handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;

use crate::db::user_repo;
use crate::error::{AppError, ErrorResponse};
use crate::middleware::Caller;
use crate::models::user::{User, UsersResponse};

/// List every registered user, caller included
#[utoipa::path(
    get,
    path = "/users",
    tag = "Users",
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Registered users", body = UsersResponse),
        (status = 401, description = "Missing or invalid token", body = ErrorResponse),
        (status = 404, description = "No users found", body = ErrorResponse)
    )
)]
pub async fn list_users(
    _caller: Caller,
    pool: web::Data<PgPool>,
) -> Result<HttpResponse, AppError> {
    let users = user_repo::list_users(pool.get_ref()).await?;

    if users.is_empty() {
        return Err(AppError::NotFound("No users found".to_string()));
    }

    Ok(HttpResponse::Ok().json(UsersResponse {
        users: users.iter().map(User::profile).collect(),
    }))
}
