pub mod analytics;
pub mod common;
pub mod import_log;
pub mod sales_record;
pub mod transaction;

pub use common::SalesFilters;
pub use transaction::*;
