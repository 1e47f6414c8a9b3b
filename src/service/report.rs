//! Budget-vs-spending aggregation.
//!
//! Every view of a month's budget position (dashboard, report summary, CSV export) is built
//! from [`budget_report`], so they can never disagree on a figure or a threshold.

use crate::database::budget::BudgetRepository;
use crate::database::category::CategoryRepository;
use crate::database::expense::ExpenseRepository;
use crate::error::app_error::AppError;
use crate::models::budget::Budget;
use crate::models::category::Category;
use crate::models::expense::Expense;
use crate::models::period::Period;
use crate::models::report::{BudgetReport, BudgetStatus, CategoryStatus, ReportSummaryResponse};
use rust_decimal::Decimal;
use tracing::debug;
use uuid::Uuid;

/// Percent of the budget at which a category starts warning.
const WARNING_THRESHOLD: Decimal = Decimal::from_parts(90, 0, 0, false, 0);

pub struct ReportService<'a, R> {
    repository: &'a R,
}

impl<'a, R> ReportService<'a, R>
where
    R: CategoryRepository + ExpenseRepository + BudgetRepository + Sync,
{
    pub fn new(repository: &'a R) -> Self {
        Self { repository }
    }

    pub async fn compute_budget_vs_spending(&self, user_id: &Uuid, period: Period) -> Result<BudgetReport, AppError> {
        let categories = self.repository.list_categories().await?;
        let expenses = self.repository.list_expenses_for_period(user_id, &period).await?;
        let budgets = self.repository.list_budgets_for_period(user_id, &period).await?;

        debug!(
            user_id = %user_id,
            month = period.month,
            year = period.year,
            expenses = expenses.len(),
            budgets = budgets.len(),
            "computing budget report"
        );

        budget_report(period, &categories, &expenses, &budgets)
    }

    pub async fn summary(&self, user_id: &Uuid, period: Period) -> Result<ReportSummaryResponse, AppError> {
        let report = self.compute_budget_vs_spending(user_id, period).await?;

        Ok(ReportSummaryResponse {
            period,
            total_expenses: self.repository.count_expenses(user_id).await?,
            total_budgets: self.repository.count_budgets(user_id).await?,
            monthly_spending: report.total_spending,
            monthly_budget: report.total_budget,
        })
    }
}

/// Joins one period's expenses and budgets per category, in the order `categories` is given.
/// Rows dated outside `period` are ignored.
#[allow(clippy::result_large_err)]
pub fn budget_report(period: Period, categories: &[Category], expenses: &[Expense], budgets: &[Budget]) -> Result<BudgetReport, AppError> {
    let expenses: Vec<&Expense> = expenses.iter().filter(|e| period.contains(e.date)).collect();
    let budgets: Vec<&Budget> = budgets.iter().filter(|b| b.period == period).collect();

    let statuses = categories
        .iter()
        .map(|category| {
            let spending = checked_sum(expenses.iter().filter(|e| e.category.id == category.id).map(|e| e.amount))?;
            let budget = budgets
                .iter()
                .find(|b| b.category.id == category.id)
                .map(|b| b.amount)
                .unwrap_or(Decimal::ZERO);

            category_status(category, spending, budget)
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(BudgetReport {
        period,
        categories: statuses,
        total_spending: checked_sum(expenses.iter().map(|e| e.amount))?,
        total_budget: checked_sum(budgets.iter().map(|b| b.amount))?,
    })
}

#[allow(clippy::result_large_err)]
pub fn category_status(category: &Category, spending: Decimal, budget: Decimal) -> Result<CategoryStatus, AppError> {
    let has_budget = budget > Decimal::ZERO;
    let percent_used = if has_budget {
        spending
            .checked_mul(Decimal::ONE_HUNDRED)
            .and_then(|scaled| scaled.checked_div(budget))
            .ok_or_else(|| overflow("percent used"))?
    } else {
        Decimal::ZERO
    };
    let alert = has_budget && spending > budget;
    let warning = has_budget && !alert && percent_used >= WARNING_THRESHOLD;

    let status = if alert {
        BudgetStatus::OverBudget
    } else if warning {
        BudgetStatus::Warning
    } else if has_budget {
        BudgetStatus::Ok
    } else {
        BudgetStatus::NoBudget
    };

    Ok(CategoryStatus {
        category_id: category.id,
        category: category.name.clone(),
        spending,
        budget,
        remaining: budget.checked_sub(spending).ok_or_else(|| overflow("remaining budget"))?,
        percent_used,
        alert,
        warning,
        status,
    })
}

fn checked_sum(mut amounts: impl Iterator<Item = Decimal>) -> Result<Decimal, AppError> {
    amounts.try_fold(Decimal::ZERO, |acc, amount| acc.checked_add(amount).ok_or_else(|| overflow("amount total")))
}

fn overflow(what: &str) -> AppError {
    AppError::decimal(format!("{what} overflowed"), rust_decimal::Error::ExceedsMaximumPossibleValue)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{sample_budget, sample_categories, sample_expense};
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use rust_decimal_macros::dec;

    fn june() -> Period {
        Period::new(6, 2024).unwrap()
    }

    fn june_day(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, day).unwrap()
    }

    fn food() -> Category {
        sample_categories().remove(0)
    }

    #[test]
    fn empty_period_reports_no_budget_everywhere() {
        let categories = sample_categories();
        let report = budget_report(june(), &categories, &[], &[]).unwrap();

        assert_eq!(report.categories.len(), categories.len());
        for status in &report.categories {
            assert_eq!(status.spending, Decimal::ZERO);
            assert_eq!(status.remaining, Decimal::ZERO);
            assert_eq!(status.percent_used, Decimal::ZERO);
            assert!(!status.alert);
            assert!(!status.warning);
            assert_eq!(status.status, BudgetStatus::NoBudget);
        }
        assert_eq!(report.total_spending, Decimal::ZERO);
        assert_eq!(report.total_budget, Decimal::ZERO);
    }

    #[test]
    fn spending_over_budget_alerts() {
        let status = category_status(&food(), dec!(101), dec!(100)).unwrap();
        assert!(status.alert);
        assert!(!status.warning);
        assert_eq!(status.status, BudgetStatus::OverBudget);
        assert_eq!(status.remaining, dec!(-1));
    }

    #[test]
    fn ninety_percent_warns() {
        let status = category_status(&food(), dec!(90), dec!(100)).unwrap();
        assert_eq!(status.percent_used, dec!(90));
        assert!(status.warning);
        assert!(!status.alert);
        assert_eq!(status.status, BudgetStatus::Warning);
    }

    #[test]
    fn spending_exactly_at_budget_warns_but_does_not_alert() {
        let status = category_status(&food(), dec!(100), dec!(100)).unwrap();
        assert!(!status.alert);
        assert!(status.warning);
        assert_eq!(status.remaining, Decimal::ZERO);
    }

    #[test]
    fn half_spent_is_ok() {
        let status = category_status(&food(), dec!(50), dec!(100)).unwrap();
        assert_eq!(status.status, BudgetStatus::Ok);
        assert!(!status.alert);
        assert!(!status.warning);
    }

    #[test]
    fn spending_without_budget_never_alerts() {
        let status = category_status(&food(), dec!(500), Decimal::ZERO).unwrap();
        assert_eq!(status.percent_used, Decimal::ZERO);
        assert_eq!(status.remaining, dec!(-500));
        assert!(!status.alert);
        assert_eq!(status.status, BudgetStatus::NoBudget);
    }

    #[test]
    fn overspent_budget_reports_percent_above_hundred() {
        let categories = sample_categories();
        let food = &categories[0];
        let expenses = vec![sample_expense(food, dec!(50), june_day(1))];
        let budgets = vec![sample_budget(food, dec!(40), june())];

        let report = budget_report(june(), &categories, &expenses, &budgets).unwrap();
        let food_status = &report.categories[0];

        assert_eq!(food_status.spending, dec!(50));
        assert_eq!(food_status.percent_used, dec!(125));
        assert!(food_status.alert);
        assert_eq!(report.total_budget, dec!(40));
    }

    #[test]
    fn rows_outside_the_period_are_ignored() {
        let categories = sample_categories();
        let food = &categories[0];
        let expenses = vec![
            sample_expense(food, dec!(10), june_day(30)),
            sample_expense(food, dec!(99), NaiveDate::from_ymd_opt(2024, 7, 1).unwrap()),
            sample_expense(food, dec!(99), NaiveDate::from_ymd_opt(2023, 6, 15).unwrap()),
        ];
        let budgets = vec![sample_budget(food, dec!(20), Period::new(7, 2024).unwrap())];

        let report = budget_report(june(), &categories, &expenses, &budgets).unwrap();

        assert_eq!(report.categories[0].spending, dec!(10));
        assert_eq!(report.categories[0].budget, Decimal::ZERO);
        assert_eq!(report.total_spending, dec!(10));
        assert_eq!(report.total_budget, Decimal::ZERO);
    }

    #[test]
    fn categories_keep_listing_order() {
        let categories = sample_categories();
        let report = budget_report(june(), &categories, &[], &[]).unwrap();
        let names: Vec<&str> = report.categories.iter().map(|s| s.category.as_str()).collect();
        let expected: Vec<&str> = categories.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, expected);
    }

    #[test]
    fn huge_totals_fail_instead_of_panicking() {
        let categories = sample_categories();
        let food = &categories[0];
        let expenses = vec![
            sample_expense(food, Decimal::MAX, june_day(1)),
            sample_expense(food, Decimal::MAX, june_day(2)),
        ];

        let result = budget_report(june(), &categories, &expenses, &[]);
        assert!(matches!(result, Err(AppError::Decimal { .. })));
    }

    #[test]
    fn huge_percent_fails_instead_of_panicking() {
        let result = category_status(&food(), Decimal::from_i128_with_scale(10i128.pow(27), 0), dec!(1));
        assert!(matches!(result, Err(AppError::Decimal { .. })));
    }

    proptest! {
        #[test]
        fn total_spending_is_sum_of_category_spending(
            amounts in prop::collection::vec((0usize..6, 1i64..1_000_000, 1u32..=30), 0..40)
        ) {
            let categories = sample_categories();
            let expenses: Vec<Expense> = amounts
                .iter()
                .map(|(idx, cents, day)| sample_expense(&categories[*idx], Decimal::new(*cents, 2), june_day(*day)))
                .collect();

            let report = budget_report(june(), &categories, &expenses, &[]).unwrap();
            let per_category: Decimal = report.categories.iter().map(|s| s.spending).sum();

            prop_assert_eq!(report.total_spending, per_category);
        }

        #[test]
        fn flags_are_mutually_exclusive_and_match_status(
            spending_cents in 0i64..1_000_000,
            budget_cents in 0i64..1_000_000,
        ) {
            let status = category_status(&food(), Decimal::new(spending_cents, 2), Decimal::new(budget_cents, 2)).unwrap();

            prop_assert!(!(status.alert && status.warning));
            prop_assert_eq!(status.remaining, status.budget - status.spending);
            let expected = match (status.alert, status.warning, budget_cents > 0) {
                (true, _, _) => BudgetStatus::OverBudget,
                (false, true, _) => BudgetStatus::Warning,
                (false, false, true) => BudgetStatus::Ok,
                (false, false, false) => BudgetStatus::NoBudget,
            };
            prop_assert_eq!(status.status, expected);
        }
    }
}
