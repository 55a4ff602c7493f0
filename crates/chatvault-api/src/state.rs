//! Application state wiring all services together.
//!
//! `ChatService` is generic over the store trait; AppState pins it to the
//! SQLite implementation and carries the two request guards.

use std::sync::Arc;

use anyhow::Context;
use chatvault_core::auth::ApiKeyGate;
use chatvault_core::chat::service::ChatService;
use chatvault_core::ratelimit::RateLimiter;
use chatvault_infra::sqlite::chat::SqliteChatStore;
use chatvault_infra::sqlite::pool::DatabasePool;
use chatvault_types::config::ServiceConfig;

/// Concrete type alias for the service generic pinned to the infra implementation.
pub type ConcreteChatService = ChatService<SqliteChatStore>;

/// Shared application state for the REST API handlers and middleware.
#[derive(Clone)]
pub struct AppState {
    pub chat_service: Arc<ConcreteChatService>,
    pub gate: Arc<ApiKeyGate>,
    /// `None` when rate limiting is disabled in configuration.
    pub limiter: Option<Arc<RateLimiter>>,
    pub config: Arc<ServiceConfig>,
    pub db_pool: DatabasePool,
}

impl AppState {
    /// Initialize the application state: connect to the database, wire services.
    pub async fn init(config: ServiceConfig) -> anyhow::Result<Self> {
        let db_pool = DatabasePool::new(&config.database.url)
            .await
            .context("failed to open database")?;
        Self::from_parts(config, db_pool)
    }

    /// Wire services over an already-open pool.
    ///
    /// Fails when no API key is configured; the service never runs unguarded.
    pub fn from_parts(config: ServiceConfig, db_pool: DatabasePool) -> anyhow::Result<Self> {
        let api_key = config.auth.api_key.as_ref().context(
            "no API key configured; set CHATVAULT_API_KEY (or API_KEY) or auth.api_key in the config file",
        )?;
        let gate = ApiKeyGate::new(api_key);

        let limiter = config
            .rate_limit
            .enabled
            .then(|| Arc::new(RateLimiter::from_config(&config.rate_limit)));

        let chat_service = ChatService::new(SqliteChatStore::new(db_pool.clone()), &config.store);

        Ok(Self {
            chat_service: Arc::new(chat_service),
            gate: Arc::new(gate),
            limiter,
            config: Arc::new(config),
            db_pool,
        })
    }
}
