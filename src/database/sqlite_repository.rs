use crate::error::app_error::AppError;
use rust_decimal::Decimal;
use sqlx::SqlitePool;
use std::str::FromStr;

#[derive(Clone)]
pub struct SqliteRepository {
    pub pool: SqlitePool,
}

/// Amounts are persisted as canonical decimal text.
#[allow(clippy::result_large_err)]
pub(crate) fn parse_amount(text: &str) -> Result<Decimal, AppError> {
    Decimal::from_str(text).map_err(|e| AppError::decimal(format!("Invalid stored amount '{}'", text), e))
}

pub(crate) fn amount_to_db(amount: &Decimal) -> String {
    amount.normalize().to_string()
}
