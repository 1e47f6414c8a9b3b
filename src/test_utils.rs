use crate::config::{Config, DatabaseConfig};
use crate::database::category::CategoryRepository;
use crate::database::sqlite_repository::SqliteRepository;
use crate::db::init_pool;
use crate::models::budget::{Budget, BudgetRequest};
use crate::models::category::{Category, DEFAULT_CATEGORIES};
use crate::models::expense::{Expense, ExpenseRequest};
use crate::models::period::Period;
use crate::models::user::User;
use chrono::{NaiveDate, Utc};
use rocket::http::{ContentType, Status};
use rocket::local::asynchronous::Client;
use rust_decimal::Decimal;
use tempfile::TempDir;
use uuid::Uuid;

fn test_database_config(dir: &TempDir) -> DatabaseConfig {
    DatabaseConfig {
        url: format!("sqlite://{}", dir.path().join("ledger.db").display()),
        max_connections: 4,
        min_connections: 1,
        ..DatabaseConfig::default()
    }
}

/// Fresh, migrated and seeded database in a temp directory. Keep the `TempDir` alive for the
/// duration of the test.
pub async fn test_repository() -> (SqliteRepository, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let pool = init_pool(&test_database_config(&dir)).await.expect("init test pool");
    (SqliteRepository { pool }, dir)
}

pub async fn test_client() -> (Client, TempDir) {
    let dir = TempDir::new().expect("create temp dir");
    let config = Config {
        database: test_database_config(&dir),
        ..Config::default()
    };
    let client = Client::tracked(crate::build_rocket(config)).await.expect("valid rocket instance");
    (client, dir)
}

/// Registers `name` with email `{name}@x.com` and password `pw`, then logs in.
pub async fn register_and_login(client: &Client, name: &str) {
    let register = client
        .post("/register")
        .header(ContentType::JSON)
        .body(format!(
            r#"{{"username":"{name}","email":"{name}@x.com","password":"pw","confirm_password":"pw"}}"#
        ))
        .dispatch()
        .await;
    assert_eq!(register.status(), Status::Created);

    let login = client
        .post("/login")
        .header(ContentType::JSON)
        .body(format!(r#"{{"email":"{name}@x.com","password":"pw"}}"#))
        .dispatch()
        .await;
    assert_eq!(login.status(), Status::Ok);
}

pub async fn create_test_user(repo: &SqliteRepository, name: &str) -> User {
    repo.create_user(name, &format!("{name}@x.com"), "pw").await.expect("create test user")
}

pub fn expense_request(amount: Decimal, category_id: Uuid, date: NaiveDate) -> ExpenseRequest {
    ExpenseRequest {
        amount,
        category_id,
        description: None,
        date: Some(date),
    }
}

pub fn budget_request(amount: Decimal, category_id: Uuid, month: u32, year: i32) -> BudgetRequest {
    BudgetRequest {
        amount,
        category_id,
        month,
        year,
    }
}

/// In-memory stand-ins for the seeded categories, in listing order.
pub fn sample_categories() -> Vec<Category> {
    DEFAULT_CATEGORIES
        .iter()
        .map(|name| Category {
            id: Uuid::new_v4(),
            name: name.to_string(),
        })
        .collect()
}

pub fn sample_expense(category: &Category, amount: Decimal, date: NaiveDate) -> Expense {
    Expense {
        id: Uuid::new_v4(),
        amount,
        date,
        description: None,
        user_id: Uuid::nil(),
        category: category.clone(),
        created_at: Utc::now(),
    }
}

pub fn sample_budget(category: &Category, amount: Decimal, period: Period) -> Budget {
    Budget {
        id: Uuid::new_v4(),
        amount,
        period,
        user_id: Uuid::nil(),
        category: category.clone(),
        created_at: Utc::now(),
    }
}

impl SqliteRepository {
    pub async fn category_named(&self, name: &str) -> Category {
        self.list_categories()
            .await
            .expect("list categories")
            .into_iter()
            .find(|c| c.name == name)
            .expect("seeded category")
    }
}
