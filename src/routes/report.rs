use crate::auth::CurrentUser;
use crate::database::expense::ExpenseRepository;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::period::Period;
use crate::models::report::ReportSummaryResponse;
use crate::service::export::{EXPENSE_LEDGER_FILENAME, budget_report_csv, budget_report_filename, expense_ledger_csv};
use crate::service::report::ReportService;
use rocket::http::{ContentType, Header, Status};
use rocket::response::{Responder, Response};
use rocket::serde::json::Json;
use rocket::{Request, State, get};
use rocket_okapi::OpenApiError;
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::openapi3::Responses;
use rocket_okapi::openapi;
use rocket_okapi::response::OpenApiResponderInner;
use sqlx::SqlitePool;
use std::io::Cursor;

/// A CSV body served as a file download.
pub struct CsvDownload {
    pub filename: String,
    pub body: String,
}

impl<'r> Responder<'r, 'static> for CsvDownload {
    fn respond_to(self, _: &'r Request<'_>) -> rocket::response::Result<'static> {
        Response::build()
            .status(Status::Ok)
            .header(ContentType::CSV)
            .header(Header::new("Content-Disposition", format!("attachment; filename={}", self.filename)))
            .sized_body(self.body.len(), Cursor::new(self.body))
            .ok()
    }
}

impl OpenApiResponderInner for CsvDownload {
    fn responses(_gen: &mut OpenApiGenerator) -> Result<Responses, OpenApiError> {
        use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse};
        let mut responses = Responses::default();
        responses.responses.insert(
            "200".to_string(),
            RefOr::Object(OpenApiResponse {
                description: "CSV file download".to_string(),
                ..Default::default()
            }),
        );
        Ok(responses)
    }
}

/// Record counts of the caller plus the spending and budget totals of a month.
#[openapi(tag = "Reports")]
#[get("/reports?<month>&<year>")]
pub async fn get_reports(
    pool: &State<SqlitePool>,
    current_user: CurrentUser,
    month: Option<&str>,
    year: Option<&str>,
) -> Result<Json<ReportSummaryResponse>, AppError> {
    let period = Period::from_query(month, year)?;
    let repo = SqliteRepository { pool: pool.inner().clone() };
    Ok(Json(ReportService::new(&repo).summary(&current_user.id, period).await?))
}

/// Budget vs spending of a month as `budget_spending_{month}_{year}.csv`.
#[openapi(tag = "Reports")]
#[get("/reports/download/budget-spending?<month>&<year>")]
pub async fn download_budget_spending(
    pool: &State<SqlitePool>,
    current_user: CurrentUser,
    month: Option<&str>,
    year: Option<&str>,
) -> Result<CsvDownload, AppError> {
    let period = Period::from_query(month, year)?;
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let report = ReportService::new(&repo).compute_budget_vs_spending(&current_user.id, period).await?;

    Ok(CsvDownload {
        filename: budget_report_filename(&period),
        body: budget_report_csv(&report)?,
    })
}

/// Every expense of the caller, newest first, as `expenses_all.csv`.
#[openapi(tag = "Reports")]
#[get("/reports/download/expenses")]
pub async fn download_expenses(pool: &State<SqlitePool>, current_user: CurrentUser) -> Result<CsvDownload, AppError> {
    let repo = SqliteRepository { pool: pool.inner().clone() };
    let expenses = repo.list_all_expenses(&current_user.id).await?;

    Ok(CsvDownload {
        filename: EXPENSE_LEDGER_FILENAME.to_string(),
        body: expense_ledger_csv(&expenses)?,
    })
}

pub fn routes() -> (Vec<rocket::Route>, okapi::openapi3::OpenApi) {
    rocket_okapi::openapi_get_routes_spec![get_reports, download_budget_spending, download_expenses]
}
