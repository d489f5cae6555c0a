//! Data models shared across database access and API handlers.

pub mod analytics;
pub mod import_log;
pub mod sales_record;
