use crate::models::category::{Category, CategoryResponse};
use crate::models::period::Period;
use chrono::{DateTime, Utc};
use rocket::serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use uuid::Uuid;
use validator::Validate;

#[derive(Debug, Clone)]
pub struct Budget {
    pub id: Uuid,
    pub amount: Decimal,
    pub period: Period,
    pub user_id: Uuid,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct BudgetRequest {
    #[validate(custom(function = "crate::models::expense::validate_amount"))]
    pub amount: Decimal,
    pub category_id: Uuid,
    #[validate(range(min = 1, max = 12))]
    pub month: u32,
    #[validate(range(min = 1, max = 9999))]
    pub year: i32,
}

/// Whether an upsert inserted a new row or overwrote the amount of an existing one.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq, JsonSchema)]
pub enum UpsertOutcome {
    Created,
    Updated,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct BudgetResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub month: u32,
    pub year: i32,
    pub category: CategoryResponse,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct BudgetUpsertResponse {
    pub message: String,
    pub outcome: UpsertOutcome,
    pub budget: BudgetResponse,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct BudgetListResponse {
    pub budgets: Vec<BudgetResponse>,
    pub categories: Vec<CategoryResponse>,
    pub default_period: Period,
}

impl From<&Budget> for BudgetResponse {
    fn from(budget: &Budget) -> Self {
        Self {
            id: budget.id,
            amount: budget.amount,
            month: budget.period.month,
            year: budget.period.year,
            category: CategoryResponse::from(&budget.category),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn rejects_month_outside_calendar() {
        let request = BudgetRequest {
            amount: dec!(100),
            category_id: Uuid::new_v4(),
            month: 13,
            year: 2024,
        };
        let errors = request.validate().unwrap_err();
        assert!(errors.field_errors().contains_key("month"));
    }
}
