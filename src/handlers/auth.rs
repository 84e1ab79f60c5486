/// Registration and login handlers
use actix_web::{web, HttpResponse};
use sqlx::PgPool;
use validator::Validate;

use crate::db::user_repo;
use crate::error::{AppError, ErrorResponse};
use crate::models::user::{LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use crate::security::{password, TokenIssuer};

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.code().as_deref() == Some("23505"))
}

/// Register endpoint handler
#[utoipa::path(
    post,
    path = "/users/register",
    tag = "Users",
    request_body = RegisterRequest,
    responses(
        (status = 200, description = "User registered", body = RegisterResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 409, description = "Email already registered", body = ErrorResponse)
    )
)]
pub async fn register(
    pool: web::Data<PgPool>,
    payload: web::Json<RegisterRequest>,
) -> Result<HttpResponse, AppError> {
    // Trim inputs and validate with validator crate
    let req = RegisterRequest {
        email: payload.email.trim().to_string(),
        name: payload.name.trim().to_string(),
        password: payload.password.clone(),
    };
    req.validate()?;

    if user_repo::email_exists(pool.get_ref(), &req.email).await? {
        return Err(AppError::Conflict(
            "User already registered with this email".to_string(),
        ));
    }

    let password_hash = password::hash_password(&req.password)?;

    // A concurrent registration can still slip past the existence check; the
    // unique index on email turns that into a conflict, not a server fault.
    let user =
        match user_repo::create_user(pool.get_ref(), &req.email, &req.name, &password_hash).await {
            Ok(user) => user,
            Err(e) if is_unique_violation(&e) => {
                return Err(AppError::Conflict(
                    "User already registered with this email".to_string(),
                ));
            }
            Err(e) => return Err(e.into()),
        };

    tracing::info!(user_id = %user.id, "user registered");

    Ok(HttpResponse::Ok().json(RegisterResponse {
        user_id: user.id,
        name: user.display_name,
        email: user.email,
    }))
}

/// Login endpoint handler
#[utoipa::path(
    post,
    path = "/users/login",
    tag = "Users",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "User logged in", body = LoginResponse),
        (status = 400, description = "Validation failed", body = ErrorResponse),
        (status = 401, description = "Invalid credentials", body = ErrorResponse)
    )
)]
pub async fn login(
    pool: web::Data<PgPool>,
    issuer: web::Data<TokenIssuer>,
    payload: web::Json<LoginRequest>,
) -> Result<HttpResponse, AppError> {
    let req = LoginRequest {
        email: payload.email.trim().to_string(),
        password: payload.password.clone(),
    };
    req.validate()?;

    let user = user_repo::find_by_email(pool.get_ref(), &req.email)
        .await?
        .ok_or_else(|| AppError::Authentication("User not found".to_string()))?;

    if !password::verify_password(&req.password, &user.password_hash)? {
        return Err(AppError::Authentication("Invalid credentials".to_string()));
    }

    let token = issuer.issue(&user)?;

    tracing::debug!(user_id = %user.id, "login succeeded");

    Ok(HttpResponse::Ok().json(LoginResponse {
        token,
        profile: user.profile(),
    }))
}
