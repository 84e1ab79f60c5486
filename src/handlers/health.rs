use actix_web::{web, HttpResponse, Responder};
use serde::Serialize;
use sqlx::PgPool;

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    service: &'static str,
    version: &'static str,
    database: &'static str,
}

/// Liveness probe; reports degraded when the database is unreachable.
pub async fn health_check(pool: web::Data<PgPool>) -> impl Responder {
    let database = match sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool.get_ref())
        .await
    {
        Ok(_) => "reachable",
        Err(_) => "unreachable",
    };

    HttpResponse::Ok().json(HealthResponse {
        status: if database == "reachable" {
            "ok"
        } else {
            "degraded"
        },
        service: env!("CARGO_PKG_NAME"),
        version: env!("CARGO_PKG_VERSION"),
        database,
    })
}
