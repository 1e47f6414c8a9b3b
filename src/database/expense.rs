use crate::database::sqlite_repository::{SqliteRepository, amount_to_db, parse_amount};
use crate::error::app_error::AppError;
use crate::models::category::Category;
use crate::models::expense::{Expense, ExpenseRequest};
use crate::models::pagination::PageParams;
use crate::models::period::Period;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct ExpenseRow {
    id: Uuid,
    amount: String,
    date: NaiveDate,
    description: Option<String>,
    user_id: Uuid,
    category_id: Uuid,
    category_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = AppError;

    fn try_from(row: ExpenseRow) -> Result<Self, Self::Error> {
        Ok(Expense {
            id: row.id,
            amount: parse_amount(&row.amount)?,
            date: row.date,
            description: row.description,
            user_id: row.user_id,
            category: Category {
                id: row.category_id,
                name: row.category_name,
            },
            created_at: row.created_at,
        })
    }
}

const EXPENSE_SELECT: &str = r#"
    SELECT
        e.id,
        e.amount,
        e.date,
        e.description,
        e.user_id,
        c.id AS category_id,
        c.name AS category_name,
        e.created_at
    FROM expense e
    JOIN category c ON c.id = e.category_id
"#;

fn into_expenses(rows: Vec<ExpenseRow>) -> Result<Vec<Expense>, AppError> {
    rows.into_iter().map(Expense::try_from).collect()
}

#[async_trait::async_trait]
pub trait ExpenseRepository {
    async fn create_expense(&self, request: &ExpenseRequest, user_id: &Uuid) -> Result<Expense, AppError>;
    /// Looks an expense up regardless of owner; callers check ownership.
    async fn get_expense_by_id(&self, id: &Uuid) -> Result<Option<Expense>, AppError>;
    /// Newest first, one page at a time, with the total row count.
    async fn list_expenses(&self, user_id: &Uuid, params: &PageParams) -> Result<(Vec<Expense>, i64), AppError>;
    /// Every expense of the user, date descending.
    async fn list_all_expenses(&self, user_id: &Uuid) -> Result<Vec<Expense>, AppError>;
    async fn list_expenses_for_period(&self, user_id: &Uuid, period: &Period) -> Result<Vec<Expense>, AppError>;
    async fn count_expenses(&self, user_id: &Uuid) -> Result<i64, AppError>;
    async fn delete_expense(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl ExpenseRepository for SqliteRepository {
    async fn create_expense(&self, request: &ExpenseRequest, user_id: &Uuid) -> Result<Expense, AppError> {
        let id = Uuid::new_v4();
        let date = request.date.unwrap_or_else(|| Utc::now().date_naive());
        let description = request.description.as_deref().map(str::trim).filter(|d| !d.is_empty());

        sqlx::query(
            r#"
            INSERT INTO expense (id, amount, date, description, user_id, category_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(id)
        .bind(amount_to_db(&request.amount))
        .bind(date)
        .bind(description)
        .bind(user_id)
        .bind(request.category_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        self.get_expense_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Expense not found".to_string()))
    }

    async fn get_expense_by_id(&self, id: &Uuid) -> Result<Option<Expense>, AppError> {
        let row = sqlx::query_as::<_, ExpenseRow>(&format!("{} WHERE e.id = ?", EXPENSE_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Expense::try_from).transpose()
    }

    async fn list_expenses(&self, user_id: &Uuid, params: &PageParams) -> Result<(Vec<Expense>, i64), AppError> {
        let total = self.count_expenses(user_id).await?;

        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{} WHERE e.user_id = ? ORDER BY e.date DESC, e.created_at DESC LIMIT ? OFFSET ?",
            EXPENSE_SELECT
        ))
        .bind(user_id)
        .bind(params.limit)
        .bind(params.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok((into_expenses(rows)?, total))
    }

    async fn list_all_expenses(&self, user_id: &Uuid) -> Result<Vec<Expense>, AppError> {
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{} WHERE e.user_id = ? ORDER BY e.date DESC, e.created_at DESC",
            EXPENSE_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_expenses(rows)
    }

    async fn list_expenses_for_period(&self, user_id: &Uuid, period: &Period) -> Result<Vec<Expense>, AppError> {
        let (start, end) = period.date_range();
        let rows = sqlx::query_as::<_, ExpenseRow>(&format!(
            "{} WHERE e.user_id = ? AND e.date >= ? AND e.date < ? ORDER BY e.date DESC, e.created_at DESC",
            EXPENSE_SELECT
        ))
        .bind(user_id)
        .bind(start)
        .bind(end)
        .fetch_all(&self.pool)
        .await?;

        into_expenses(rows)
    }

    async fn count_expenses(&self, user_id: &Uuid) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM expense WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn delete_expense(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM expense WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Expense not found".to_string()));
        }
        Ok(())
    }
}
