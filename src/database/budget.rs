use crate::database::sqlite_repository::{SqliteRepository, amount_to_db, parse_amount};
use crate::error::app_error::AppError;
use crate::models::budget::{Budget, BudgetRequest, UpsertOutcome};
use crate::models::category::Category;
use crate::models::period::Period;
use chrono::{DateTime, Utc};
use uuid::Uuid;

#[derive(Debug, sqlx::FromRow)]
struct BudgetRow {
    id: Uuid,
    amount: String,
    month: u32,
    year: i32,
    user_id: Uuid,
    category_id: Uuid,
    category_name: String,
    created_at: DateTime<Utc>,
}

impl TryFrom<BudgetRow> for Budget {
    type Error = AppError;

    fn try_from(row: BudgetRow) -> Result<Self, Self::Error> {
        Ok(Budget {
            id: row.id,
            amount: parse_amount(&row.amount)?,
            period: Period::new(row.month, row.year)?,
            user_id: row.user_id,
            category: Category {
                id: row.category_id,
                name: row.category_name,
            },
            created_at: row.created_at,
        })
    }
}

const BUDGET_SELECT: &str = r#"
    SELECT
        b.id,
        b.amount,
        b.month,
        b.year,
        b.user_id,
        c.id AS category_id,
        c.name AS category_name,
        b.created_at
    FROM budget b
    JOIN category c ON c.id = b.category_id
"#;

fn into_budgets(rows: Vec<BudgetRow>) -> Result<Vec<Budget>, AppError> {
    rows.into_iter().map(Budget::try_from).collect()
}

#[async_trait::async_trait]
pub trait BudgetRepository {
    /// Inserts the budget for (user, category, month, year) or overwrites the amount of the
    /// existing row, in a single statement.
    async fn upsert_budget(&self, request: &BudgetRequest, user_id: &Uuid) -> Result<(Budget, UpsertOutcome), AppError>;
    /// Looks a budget up regardless of owner; callers check ownership.
    async fn get_budget_by_id(&self, id: &Uuid) -> Result<Option<Budget>, AppError>;
    async fn list_budgets(&self, user_id: &Uuid) -> Result<Vec<Budget>, AppError>;
    async fn list_budgets_for_period(&self, user_id: &Uuid, period: &Period) -> Result<Vec<Budget>, AppError>;
    async fn count_budgets(&self, user_id: &Uuid) -> Result<i64, AppError>;
    async fn delete_budget(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError>;
}

#[async_trait::async_trait]
impl BudgetRepository for SqliteRepository {
    async fn upsert_budget(&self, request: &BudgetRequest, user_id: &Uuid) -> Result<(Budget, UpsertOutcome), AppError> {
        let candidate_id = Uuid::new_v4();

        let id: Uuid = sqlx::query_scalar(
            r#"
            INSERT INTO budget (id, amount, month, year, user_id, category_id, created_at)
            VALUES (?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT (user_id, category_id, month, year)
            DO UPDATE SET amount = excluded.amount
            RETURNING id
            "#,
        )
        .bind(candidate_id)
        .bind(amount_to_db(&request.amount))
        .bind(request.month)
        .bind(request.year)
        .bind(user_id)
        .bind(request.category_id)
        .bind(Utc::now())
        .fetch_one(&self.pool)
        .await?;

        let outcome = if id == candidate_id {
            UpsertOutcome::Created
        } else {
            UpsertOutcome::Updated
        };

        let budget = self
            .get_budget_by_id(&id)
            .await?
            .ok_or_else(|| AppError::NotFound("Budget not found".to_string()))?;

        Ok((budget, outcome))
    }

    async fn get_budget_by_id(&self, id: &Uuid) -> Result<Option<Budget>, AppError> {
        let row = sqlx::query_as::<_, BudgetRow>(&format!("{} WHERE b.id = ?", BUDGET_SELECT))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Budget::try_from).transpose()
    }

    async fn list_budgets(&self, user_id: &Uuid) -> Result<Vec<Budget>, AppError> {
        let rows = sqlx::query_as::<_, BudgetRow>(&format!(
            "{} WHERE b.user_id = ? ORDER BY b.year DESC, b.month DESC, c.rowid",
            BUDGET_SELECT
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        into_budgets(rows)
    }

    async fn list_budgets_for_period(&self, user_id: &Uuid, period: &Period) -> Result<Vec<Budget>, AppError> {
        let rows = sqlx::query_as::<_, BudgetRow>(&format!(
            "{} WHERE b.user_id = ? AND b.month = ? AND b.year = ? ORDER BY c.rowid",
            BUDGET_SELECT
        ))
        .bind(user_id)
        .bind(period.month)
        .bind(period.year)
        .fetch_all(&self.pool)
        .await?;

        into_budgets(rows)
    }

    async fn count_budgets(&self, user_id: &Uuid) -> Result<i64, AppError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM budget WHERE user_id = ?")
            .bind(user_id)
            .fetch_one(&self.pool)
            .await?;

        Ok(total)
    }

    async fn delete_budget(&self, id: &Uuid, user_id: &Uuid) -> Result<(), AppError> {
        let result = sqlx::query("DELETE FROM budget WHERE id = ? AND user_id = ?")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound("Budget not found".to_string()));
        }
        Ok(())
    }
}
