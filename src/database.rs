pub mod budget;
pub mod category;
pub mod expense;
pub mod session;
pub mod sqlite_repository;
pub mod user;
