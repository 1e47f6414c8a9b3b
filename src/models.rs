pub mod budget;
pub mod category;
pub mod expense;
pub mod health;
pub mod message;
pub mod pagination;
pub mod period;
pub mod report;
pub mod session;
pub mod user;
