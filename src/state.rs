use crate::config::AppConfig;
use crate::services::{DatabaseService, ListingCacheService};
use std::sync::Arc;

#[derive(Debug)]
pub struct AppState {
    pub config: AppConfig,
    pub listing_cache: Arc<ListingCacheService>,
    pub database: Arc<DatabaseService>,
}
