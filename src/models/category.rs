use rocket::serde::Serialize;
use schemars::JsonSchema;
use uuid::Uuid;

/// Categories seeded on first start, in listing order.
pub const DEFAULT_CATEGORIES: [&str; 6] = ["Food", "Transport", "Entertainment", "Utilities", "Rent", "Other"];

#[derive(Debug, Clone, PartialEq, Eq, sqlx::FromRow)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

#[derive(Serialize, Debug, Clone, JsonSchema)]
pub struct CategoryResponse {
    pub id: Uuid,
    pub name: String,
}

impl From<&Category> for CategoryResponse {
    fn from(category: &Category) -> Self {
        Self {
            id: category.id,
            name: category.name.clone(),
        }
    }
}
