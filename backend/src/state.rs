use crate::{
    config::Config,
    db::connection::DbPool,
    services::{Importer, SalesAnalytics},
};

#[derive(Clone)]
pub struct AppState {
    pub pool: DbPool,
    pub config: Config,
    pub importer: Importer,
    pub analytics: SalesAnalytics,
}

impl AppState {
    pub fn new(pool: DbPool, config: Config) -> Self {
        let importer = Importer::new(pool.clone(), config.importer_config());
        let analytics = SalesAnalytics::new(pool.clone());
        Self {
            pool,
            config,
            importer,
            analytics,
        }
    }
}

impl From<(DbPool, Config)> for AppState {
    fn from((pool, config): (DbPool, Config)) -> Self {
        Self::new(pool, config)
    }
}
