use crate::auth::CurrentUser;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::period::Period;
use crate::models::report::DashboardResponse;
use crate::service::report::ReportService;
use rocket::serde::json::Json;
use rocket::{State, get};
use rocket_okapi::openapi;
use sqlx::SqlitePool;

async fn dashboard(pool: &SqlitePool, current_user: &CurrentUser, month: Option<&str>, year: Option<&str>) -> Result<Json<DashboardResponse>, AppError> {
    let period = Period::from_query(month, year)?;
    let repo = SqliteRepository { pool: pool.clone() };
    let report = ReportService::new(&repo).compute_budget_vs_spending(&current_user.id, period).await?;
    Ok(Json(DashboardResponse::from(report)))
}

/// Budget vs spending per category for a month (default: the current one).
#[openapi(tag = "Dashboard")]
#[get("/?<month>&<year>")]
pub async fn get_index(pool: &State<SqlitePool>, current_user: CurrentUser, month: Option<&str>, year: Option<&str>) -> Result<Json<DashboardResponse>, AppError> {
    dashboard(pool.inner(), &current_user, month, year).await
}

/// Same as `/`.
#[openapi(tag = "Dashboard")]
#[get("/dashboard?<month>&<year>")]
pub async fn get_dashboard(pool: &State<SqlitePool>, current_user: CurrentUser, month: Option<&str>, year: Option<&str>) -> Result<Json<DashboardResponse>, AppError> {
    dashboard(pool.inner(), &current_user, month, year).await
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_index, get_dashboard]
}
