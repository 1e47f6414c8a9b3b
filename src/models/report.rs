use crate::models::period::Period;
use rocket::serde::Serialize;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use uuid::Uuid;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum BudgetStatus {
    #[serde(rename = "Over Budget")]
    OverBudget,
    #[serde(rename = "Warning (90%+)")]
    Warning,
    #[serde(rename = "OK")]
    Ok,
    #[serde(rename = "No Budget Set")]
    NoBudget,
}

impl BudgetStatus {
    pub fn label(self) -> &'static str {
        match self {
            BudgetStatus::OverBudget => "Over Budget",
            BudgetStatus::Warning => "Warning (90%+)",
            BudgetStatus::Ok => "OK",
            BudgetStatus::NoBudget => "No Budget Set",
        }
    }
}

/// Budget-vs-spending figures for one category in one period.
#[derive(Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct CategoryStatus {
    pub category_id: Uuid,
    pub category: String,
    pub spending: Decimal,
    pub budget: Decimal,
    pub remaining: Decimal,
    pub percent_used: Decimal,
    pub alert: bool,
    pub warning: bool,
    pub status: BudgetStatus,
}

#[derive(Serialize, Debug, Clone, PartialEq, JsonSchema)]
pub struct BudgetReport {
    pub period: Period,
    pub categories: Vec<CategoryStatus>,
    pub total_spending: Decimal,
    pub total_budget: Decimal,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct DashboardResponse {
    pub period: Period,
    pub month_name: String,
    pub total_spending: Decimal,
    pub total_budget: Decimal,
    pub budget_vs_spending: Vec<CategoryStatus>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ReportSummaryResponse {
    pub period: Period,
    pub total_expenses: i64,
    pub total_budgets: i64,
    pub monthly_spending: Decimal,
    pub monthly_budget: Decimal,
}

impl From<BudgetReport> for DashboardResponse {
    fn from(report: BudgetReport) -> Self {
        Self {
            period: report.period,
            month_name: report.period.month_name().to_string(),
            total_spending: report.total_spending,
            total_budget: report.total_budget,
            budget_vs_spending: report.categories,
        }
    }
}
