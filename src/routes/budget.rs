use crate::auth::{CurrentUser, ensure_owner};
use crate::database::budget::BudgetRepository;
use crate::database::category::CategoryRepository;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::budget::{BudgetListResponse, BudgetRequest, BudgetResponse, BudgetUpsertResponse, UpsertOutcome};
use crate::models::category::CategoryResponse;
use crate::models::message::MessageResponse;
use crate::models::period::Period;
use rocket::http::Status;
use rocket::serde::json::Json;
use rocket::{State, get, post};
use rocket_okapi::openapi;
use sqlx::SqlitePool;
use tracing::info;
use uuid::Uuid;
use validator::Validate;

/// All of the caller's budgets, newest period first, with the form defaults.
#[openapi(tag = "Budgets")]
#[get("/budgets")]
pub async fn list_budgets(pool: &State<SqlitePool>, current_user: CurrentUser) -> Result<Json<BudgetListResponse>, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let budgets = repo.list_budgets(&current_user.id).await?;
    let categories = repo.list_categories().await?;

    Ok(Json(BudgetListResponse {
        budgets: budgets.iter().map(BudgetResponse::from).collect(),
        categories: categories.iter().map(CategoryResponse::from).collect(),
        default_period: Period::current(),
    }))
}

/// Set the budget of a category for one month.
/// Answers 201 when the budget is new and 200 when it replaced the amount of an existing one.
#[openapi(tag = "Budgets")]
#[post("/budgets", data = "<payload>")]
pub async fn set_budget(
    pool: &State<SqlitePool>,
    current_user: CurrentUser,
    payload: Json<BudgetRequest>,
) -> Result<(Status, Json<BudgetUpsertResponse>), AppError> {
    payload.validate()?;

    let repo = SqliteRepository { pool: pool.inner().clone() };
    if repo.get_category_by_id(&payload.category_id).await?.is_none() {
        return Err(AppError::BadRequest("Unknown category".to_string()));
    }

    let (budget, outcome) = repo.upsert_budget(&payload, &current_user.id).await?;
    let (status, message) = match outcome {
        UpsertOutcome::Created => (Status::Created, "Budget set!"),
        UpsertOutcome::Updated => (Status::Ok, "Budget updated!"),
    };

    info!(budget_id = %budget.id, user_id = %current_user.id, outcome = ?outcome, "budget saved");
    Ok((
        status,
        Json(BudgetUpsertResponse {
            message: message.to_string(),
            outcome,
            budget: BudgetResponse::from(&budget),
        }),
    ))
}

/// Delete one of the caller's budgets.
/// Returns 400 for a malformed id, 404 if it does not exist and 403 if someone else owns it.
#[openapi(tag = "Budgets")]
#[get("/budget/delete/<id>")]
pub async fn delete_budget(pool: &State<SqlitePool>, current_user: CurrentUser, id: &str) -> Result<Json<MessageResponse>, AppError> {
    let uuid = Uuid::parse_str(id).map_err(|e| AppError::uuid("Invalid budget id", e))?;
    let repo = SqliteRepository { pool: pool.inner().clone() };

    let budget = repo
        .get_budget_by_id(&uuid)
        .await?
        .ok_or_else(|| AppError::NotFound("Budget not found".to_string()))?;
    ensure_owner(&budget, &current_user)?;

    repo.delete_budget(&uuid, &current_user.id).await?;
    info!(budget_id = %uuid, user_id = %current_user.id, "budget deleted");

    Ok(Json(MessageResponse::new("Budget deleted!")))
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![list_budgets, set_budget, delete_budget]
}
