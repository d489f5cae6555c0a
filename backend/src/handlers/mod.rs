pub mod analytics;
pub mod common;
pub mod health;
pub mod sales;
pub mod upload;
