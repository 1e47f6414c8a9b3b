use crate::error::app_error::AppError;
use chrono::{Datelike, Month, NaiveDate, Utc};
use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// A budgeting cycle: one calendar month of one year.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Hash, JsonSchema)]
pub struct Period {
    pub month: u32,
    pub year: i32,
}

impl Period {
    #[allow(clippy::result_large_err)]
    pub fn new(month: u32, year: i32) -> Result<Self, AppError> {
        if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
            return Err(AppError::InvalidPeriod { month, year });
        }
        Ok(Self { month, year })
    }

    pub fn current() -> Self {
        Self::of(Utc::now().date_naive())
    }

    pub fn of(date: NaiveDate) -> Self {
        Self {
            month: date.month(),
            year: date.year(),
        }
    }

    /// Resolves raw `month`/`year` query values, falling back to the current period for
    /// whichever part is missing. A value that is not a number is rejected.
    #[allow(clippy::result_large_err)]
    pub fn from_query(month: Option<&str>, year: Option<&str>) -> Result<Self, AppError> {
        let current = Self::current();
        let month = match month {
            Some(raw) => raw.trim().parse::<u32>().map_err(|_| AppError::BadRequest(format!("Invalid month: {raw}")))?,
            None => current.month,
        };
        let year = match year {
            Some(raw) => raw.trim().parse::<i32>().map_err(|_| AppError::BadRequest(format!("Invalid year: {raw}")))?,
            None => current.year,
        };
        Self::new(month, year)
    }

    pub fn first_day(&self) -> NaiveDate {
        NaiveDate::from_ymd_opt(self.year, self.month, 1).unwrap_or(NaiveDate::MIN)
    }

    /// Half-open date range `[first day, first day of the next month)`.
    pub fn date_range(&self) -> (NaiveDate, NaiveDate) {
        let next = if self.month == 12 {
            NaiveDate::from_ymd_opt(self.year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(self.year, self.month + 1, 1)
        };
        (self.first_day(), next.unwrap_or(NaiveDate::MAX))
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.month() == self.month && date.year() == self.year
    }

    pub fn month_name(&self) -> &'static str {
        u8::try_from(self.month)
            .ok()
            .and_then(|m| Month::try_from(m).ok())
            .map(|m| m.name())
            .unwrap_or("")
    }
}
