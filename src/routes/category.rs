use crate::auth::CurrentUser;
use crate::database::category::CategoryRepository;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::message::MessageResponse;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::SqlitePool;

/// Seed the default categories if none exist. Safe to call repeatedly.
#[openapi(tag = "Categories")]
#[get("/init_db")]
pub async fn init_db(pool: &State<SqlitePool>, _current_user: CurrentUser) -> Result<Json<MessageResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let message = if repo.ensure_default_categories().await? {
        "Default categories created!"
    } else {
        "Categories already exist."
    };
    Ok(Json(MessageResponse::new(message)))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![init_db]
}
