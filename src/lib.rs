use std::sync::Arc;

use axum::extract::FromRef;
use config::Config;
use sqlx::PgPool;

use error::AuthError;
use utils::TokenService;

pub mod common;
pub mod config;
pub mod database;
pub mod error;
pub mod middleware;
pub mod router;
pub mod routes;
pub mod utils;

#[derive(Clone, FromRef)]
pub struct AppState {
    pub pool: PgPool,
    pub config: Config,
    pub tokens: Arc<TokenService>,
}

impl AppState {
    /// Builds the token service from the configured secret.
    pub fn new(pool: PgPool, config: Config) -> Result<Self, AuthError> {
        let tokens = Arc::new(TokenService::from_config(&config)?);
        Ok(Self {
            pool,
            config,
            tokens,
        })
    }
}
