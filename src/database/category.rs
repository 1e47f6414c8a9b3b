use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use crate::models::category::{Category, DEFAULT_CATEGORIES};
use tracing::info;
use uuid::Uuid;

#[async_trait::async_trait]
pub trait CategoryRepository {
    /// All categories in insertion order.
    async fn list_categories(&self) -> Result<Vec<Category>, AppError>;
    async fn get_category_by_id(&self, id: &Uuid) -> Result<Option<Category>, AppError>;
    /// Seeds the default categories if the table is empty. Returns whether anything was inserted.
    async fn ensure_default_categories(&self) -> Result<bool, AppError>;
}

#[async_trait::async_trait]
impl CategoryRepository for SqliteRepository {
    async fn list_categories(&self) -> Result<Vec<Category>, AppError> {
        let categories = sqlx::query_as::<_, Category>("SELECT id, name FROM category ORDER BY rowid")
            .fetch_all(&self.pool)
            .await?;

        Ok(categories)
    }

    async fn get_category_by_id(&self, id: &Uuid) -> Result<Option<Category>, AppError> {
        let category = sqlx::query_as::<_, Category>("SELECT id, name FROM category WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(category)
    }

    async fn ensure_default_categories(&self) -> Result<bool, AppError> {
        let mut tx = self.pool.begin().await?;

        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM category").fetch_one(&mut *tx).await?;
        if count > 0 {
            tx.commit().await?;
            return Ok(false);
        }

        for name in DEFAULT_CATEGORIES {
            sqlx::query("INSERT INTO category (id, name) VALUES (?, ?)")
                .bind(Uuid::new_v4())
                .bind(name)
                .execute(&mut *tx)
                .await?;
        }
        tx.commit().await?;

        info!(count = DEFAULT_CATEGORIES.len(), "seeded default categories");
        Ok(true)
    }
}
