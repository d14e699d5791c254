//! Shared application state

use std::sync::Arc;

use sqlx::SqlitePool;

use crate::cart::CartStore;
use crate::config::Config;
use crate::db::DbService;
use crate::error::AppError;
use crate::live::LiveBus;
use crate::orders::OrderEngine;

/// Application state injected into every handler
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub jwt_secret: String,
    /// Shared key presented by the auth collaborator on /api/session/login
    pub auth_api_key: String,
    pub carts: Arc<CartStore>,
    pub live: LiveBus,
    pub engine: OrderEngine,
}

impl AppState {
    pub async fn new(config: &Config) -> Result<Self, AppError> {
        let db = DbService::new(&config.database_path).await?;
        let live = LiveBus::new(config.live_channel_capacity);
        let engine = OrderEngine::new(db.pool.clone(), live.clone());

        Ok(Self {
            pool: db.pool,
            jwt_secret: config.jwt_secret.clone(),
            auth_api_key: config.auth_api_key.clone(),
            carts: Arc::new(CartStore::new()),
            live,
            engine,
        })
    }
}
