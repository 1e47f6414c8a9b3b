use crate::auth::{CurrentUser, ensure_owner};
use crate::database::category::CategoryRepository;
use crate::database::expense::ExpenseRepository;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::category::CategoryResponse;
use crate::models::expense::{EXPENSES_PER_PAGE, ExpenseListResponse, ExpenseRequest, ExpenseResponse};
use crate::models::message::MessageResponse;
use crate::models::pagination::{PageParams, PaginatedResponse};
use chrono::Utc;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// Page through the caller's expenses, newest first, five per page.
/// Also returns the category choices and today's date for the entry form.
#[openapi(tag = "Expenses")]
#[get("/expenses?<page>")]
pub async fn list_expenses(pool: &State<SqlitePool>, current_user: CurrentUser, page: Option<i64>) -> Result<Json<ExpenseListResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let params = PageParams::new(page, EXPENSES_PER_PAGE);

    let (expenses, total) = repo.list_expenses(&current_user.id, &params).await?;
    let categories = repo.list_categories().await?;

    Ok(Json(ExpenseListResponse {
        expenses: PaginatedResponse::new(expenses.iter().map(ExpenseResponse::from).collect(), params, total),
        categories: categories.iter().map(CategoryResponse::from).collect(),
        default_date: Utc::now().date_naive(),
    }))
}

/// Record an expense. `date` defaults to today.
#[openapi(tag = "Expenses")]
#[post("/expenses", data = "<payload>")]
pub async fn create_expense(
    pool: &State<SqlitePool>,
    current_user: CurrentUser,
    payload: Json<ExpenseRequest>,
) -> Result<(Status, Json<ExpenseResponse>), AppError> {
    payload.validate()?;

    let repo = SqliteRepository { pool: pool.inner().clone() };
    if repo.get_category_by_id(&payload.category_id).await?.is_none() {
        return Err(AppError::BadRequest("Unknown category".to_string()));
    }

    let expense = repo.create_expense(&payload, &current_user.id).await?;
    info!(expense_id = %expense.id, user_id = %current_user.id, "expense added");

    Ok((Status::Created, Json(ExpenseResponse::from(&expense))))
}

/// Delete one of the caller's expenses.
/// Returns 400 for a malformed id, 404 if it does not exist and 403 if someone else owns it.
#[openapi(tag = "Expenses")]
#[get("/expense/delete/<id>")]
pub async fn delete_expense(pool: &State<SqlitePool>, current_user: CurrentUser, id: &str) -> Result<Json<MessageResponse>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid expense id", e))?;
    let repo = SqliteRepository { pool: pool.inner().clone() };

    let expense = repo
        .get_expense_by_id(&uuid)
        .await?
        .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))?;
    ensure_owner(&expense, &current_user)?;

    repo.delete_expense(&uuid, &current_user.id).await?;
    info!(expense_id = %uuid, user_id = %current_user.id, "expense deleted");

    Ok(Json(MessageResponse::new("Expense deleted!")))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_expenses, create_expense, delete_expense]
}
