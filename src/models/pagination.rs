use rocket::serde::{Deserialize, Serialize};
use schemars::JsonSchema;

/// Page-based pagination with a fixed page size chosen by the endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageParams {
    /// Page number (1-indexed).
    pub page: i64,
    pub limit: i64,
}

impl PageParams {
    /// Out-of-range page numbers are clamped to the first page.
    pub fn new(page: Option<i64>, limit: i64) -> Self {
        Self {
            page: page.filter(|p| *p >= 1).unwrap_or(1),
            limit: limit.max(1),
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }
}

/// Paginated response wrapper with metadata
#[derive(Debug, Clone, Deserialize, Serialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    /// Current page number (1-indexed)
    pub page: i64,
    pub limit: i64,
    /// Total number of items across all pages
    pub total_items: i64,
    pub total_pages: i64,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, params: PageParams, total_items: i64) -> Self {
        let total_pages = (total_items + params.limit - 1) / params.limit;

        Self {
            data,
            page: params.page,
            limit: params.limit,
            total_items,
            total_pages,
        }
    }
}
