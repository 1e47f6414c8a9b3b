pub mod budget;
pub mod category;
pub mod dashboard;
pub mod error;
pub mod expense;
pub mod health;
pub mod report;
pub mod user;
