use crate::models::category::{Category, CategoryResponse};
use crate::models::pagination::PaginatedResponse;
use chrono::{DateTime, NaiveDate, Utc};
use rocket::serde::{Deserialize, Serialize};
use rust_decimal::Decimal;
use schemars::JsonSchema;
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Page size of the expense list.
pub const EXPENSES_PER_PAGE: i64 = 5;

#[derive(Debug, Clone)]
pub struct Expense {
    pub id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub user_id: Uuid,
    pub category: Category,
    pub created_at: DateTime<Utc>,
}

#[derive(Deserialize, Debug, Validate, JsonSchema)]
pub struct ExpenseRequest {
    #[validate(custom(function = "crate::models::expense::validate_amount"))]
    pub amount: Decimal,
    pub category_id: Uuid,
    #[validate(length(max = 200))]
    pub description: Option<String>,
    /// Defaults to today when omitted.
    pub date: Option<NaiveDate>,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ExpenseResponse {
    pub id: Uuid,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub description: Option<String>,
    pub category: CategoryResponse,
}

#[derive(Serialize, Debug, JsonSchema)]
pub struct ExpenseListResponse {
    pub expenses: PaginatedResponse<ExpenseResponse>,
    pub categories: Vec<CategoryResponse>,
    pub default_date: NaiveDate,
}

impl From<&Expense> for ExpenseResponse {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            amount: expense.amount,
            date: expense.date,
            description: expense.description.clone(),
            category: CategoryResponse::from(&expense.category),
        }
    }
}

/// Smallest amount that no longer fits in 12 integer digits (10^12).
pub const AMOUNT_LIMIT: Decimal = Decimal::from_parts(0xD4A5_1000, 0xE8, 0, false, 0);

/// Money amounts must be strictly positive, below [`AMOUNT_LIMIT`] and carry at most two
/// decimal places.
pub fn validate_amount(amount: &Decimal) -> Result<(), ValidationError> {
    if amount.is_sign_negative() || amount.is_zero() {
        return Err(ValidationError::new("amount_must_be_positive"));
    }
    if *amount >= AMOUNT_LIMIT {
        return Err(ValidationError::new("amount_too_large"));
    }
    if amount.normalize().scale() > 2 {
        return Err(ValidationError::new("amount_too_precise"));
    }
    Ok(())
}
