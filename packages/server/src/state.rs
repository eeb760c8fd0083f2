use std::sync::Arc;

use sea_orm::DatabaseConnection;

use crate::banners::{BannerCache, Session};
use crate::config::AppConfig;

#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub config: AppConfig,
    pub banner_cache: Arc<BannerCache>,
}

impl AppState {
    pub fn new(db: DatabaseConnection, config: AppConfig) -> Self {
        let banner_cache = Arc::new(BannerCache::new(&config.cache));
        Self {
            db,
            config,
            banner_cache,
        }
    }

    /// Start a unit of work for one request.
    pub fn session(&self) -> Session {
        Session::new(self.db.clone())
    }
}
