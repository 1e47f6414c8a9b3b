//! CSV renditions of the budget report and the expense ledger.

use crate::error::app_error::AppError;
use crate::models::expense::Expense;
use crate::models::period::Period;
use crate::models::report::BudgetReport;
use rust_decimal::{Decimal, RoundingStrategy};

pub const BUDGET_REPORT_HEADER: [&str; 6] = ["Category", "Budget", "Spending", "Remaining", "Percent Used", "Status"];
pub const EXPENSE_LEDGER_HEADER: [&str; 4] = ["Date", "Category", "Description", "Amount"];
pub const EXPENSE_LEDGER_FILENAME: &str = "expenses_all.csv";

pub fn budget_report_filename(period: &Period) -> String {
    format!("budget_spending_{}_{}.csv", period.month, period.year)
}

/// Two decimals, halves rounded away from zero.
pub fn format_money(amount: Decimal) -> String {
    format!("{:.2}", amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

/// One decimal followed by `%`.
pub fn format_percent(percent: Decimal) -> String {
    format!("{:.1}%", percent.round_dp_with_strategy(1, RoundingStrategy::MidpointAwayFromZero))
}

/// One row per category, in the order of the report.
pub fn budget_report_csv(report: &BudgetReport) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(BUDGET_REPORT_HEADER)?;

    for status in &report.categories {
        writer.write_record([
            status.category.clone(),
            format_money(status.budget),
            format_money(status.spending),
            format_money(status.remaining),
            format_percent(status.percent_used),
            status.status.label().to_string(),
        ])?;
    }

    finish(writer)
}

/// One row per expense in the order given; a missing description is an empty cell.
pub fn expense_ledger_csv(expenses: &[Expense]) -> Result<String, AppError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(EXPENSE_LEDGER_HEADER)?;

    for expense in expenses {
        writer.write_record([
            expense.date.format("%Y-%m-%d").to_string(),
            expense.category.name.clone(),
            expense.description.clone().unwrap_or_default(),
            format_money(expense.amount),
        ])?;
    }

    finish(writer)
}

fn finish(writer: csv::Writer<Vec<u8>>) -> Result<String, AppError> {
    let bytes = writer.into_inner().map_err(|e| AppError::export("Failed to flush CSV output", e))?;
    String::from_utf8(bytes).map_err(|e| AppError::export("CSV output is not valid UTF-8", e))
}
