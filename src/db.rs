use crate::config::DatabaseConfig;
use crate::database::category::CategoryRepository;
use crate::database::sqlite_repository::SqliteRepository;
use crate::error::app_error::AppError;
use rocket::fairing::AdHoc;
use sqlx::SqlitePool;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use std::str::FromStr;
use std::time::Duration;

/// Opens the pool, applies pending migrations and seeds the default categories.
pub async fn init_pool(db_config: &DatabaseConfig) -> Result<SqlitePool, AppError> {
    let options = SqliteConnectOptions::from_str(&db_config.url)?
        .create_if_missing(true)
        .foreign_keys(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(db_config.busy_timeout));

    let pool = SqlitePoolOptions::new()
        .max_connections(db_config.max_connections)
        .min_connections(db_config.min_connections)
        .acquire_timeout(Duration::from_secs(db_config.acquire_timeout))
        .connect_with(options)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;

    let repo = SqliteRepository { pool: pool.clone() };
    repo.ensure_default_categories().await?;

    Ok(pool)
}

pub fn stage_db(db_config: DatabaseConfig) -> AdHoc {
    AdHoc::try_on_ignite("SQLite (sqlx)", |rocket| async move {
        match init_pool(&db_config).await {
            Ok(pool) => {
                tracing::info!(url = %db_config.url, "Database pool initialized successfully");
                Ok(rocket.manage(pool))
            }
            Err(e) => {
                tracing::error!(error = ?e, "Failed to initialize database pool");
                Err(rocket)
            }
        }
    })
}
