use crate::error::app_error::AppError;
use crate::models::health::HealthResponse;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::SqlitePool;

/// Liveness probe; also checks that the database answers.
#[openapi(tag = "Health")]
#[get("/health")]
pub async fn healthcheck(pool: &State<SqlitePool>) -> Result<Json<HealthResponse>, AppError> {
    sqlx::query("SELECT 1").execute(pool.inner()).await?;
    Ok(Json(HealthResponse {
        status: "ok",
        database: "ok",
    }))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![healthcheck]
}
