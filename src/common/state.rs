// Application state shared across all modules

use sqlx::SqlitePool;
use std::sync::Arc;
use tokio::sync::RwLock;

use super::config::AppConfig;
use crate::auth::providers::ProviderRegistry;
use crate::auth::tokens::TokenService;
use crate::conversion::ConversionService;

/// Application state containing database pool, services, and configuration
#[derive(Clone)]
pub struct AppState {
    pub db: SqlitePool,
    pub tokens: TokenService,
    pub providers: Arc<ProviderRegistry>,
    pub conversion: Arc<ConversionService>,
}

/// How handlers receive the state: `Extension<SharedState>`
pub type SharedState = Arc<RwLock<AppState>>;

impl AppState {
    pub fn new(
        db: SqlitePool,
        config: &AppConfig,
        providers: ProviderRegistry,
        conversion: ConversionService,
    ) -> Self {
        let tokens = TokenService::new(&config.secret_key, config.tokens);
        Self {
            db,
            tokens,
            providers: Arc::new(providers),
            conversion: Arc::new(conversion),
        }
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(RwLock::new(self))
    }
}
