pub mod analytics;
pub mod cleaning;
pub mod importer;

pub use analytics::SalesAnalytics;
pub use importer::{Importer, ImporterConfig};
