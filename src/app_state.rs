use std::sync::Arc;

use crate::{
    config::Config,
    infrastructure::{DatabaseInterface, SecurityService, SqliteDatabase},
};

#[derive(Clone)]
pub struct AppState {
    pub database: Arc<dyn DatabaseInterface>,
    pub security: Arc<SecurityService>,
    pub config: Config,
}

impl AppState {
    pub async fn new(config: Config) -> anyhow::Result<Self> {
        // Initialize database
        let database = SqliteDatabase::connect(&config.database.url).await?;
        database.health_check().await?;

        Ok(Self::with_database(config, Arc::new(database)))
    }

    /// Build state around an already-initialized database
    pub fn with_database(config: Config, database: Arc<dyn DatabaseInterface>) -> Self {
        let security = Arc::new(SecurityService::new(&config.session));
        Self {
            database,
            security,
            config,
        }
    }
}
