use std::env;
use std::time::Duration;

#[derive(Debug, Clone, serde::Deserialize)]
pub struct Config {
    pub database_url: String,
    pub api_secret: String,
    pub token_expiration_secs: u64,
    pub server_host: String,
    pub server_port: u16,
    pub db_max_connections: u32,
    pub seed_database: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, env::VarError> {
        dotenv::dotenv().ok();

        // TOKEN_EXPIRATION is given in hours, e.g. "1" or "1h"
        let token_expiration = env::var("TOKEN_EXPIRATION")
            .ok()
            .and_then(|v| v.trim_end_matches('h').parse::<u64>().ok())
            .unwrap_or(1);

        Ok(Config {
            database_url: env::var("DATABASE_URL")?,
            api_secret: env::var("API_SECRET")?,
            token_expiration_secs: token_expiration * 3600,
            server_host: env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            server_port: env::var("SERVER_PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
            db_max_connections: env::var("DB_MAX_CONNECTIONS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(10),
            seed_database: env::var("SEED_DATABASE")
                .map(|v| matches!(v.as_str(), "1" | "true" | "yes"))
                .unwrap_or(false),
        })
    }

    pub fn token_expiration(&self) -> Duration {
        Duration::from_secs(self.token_expiration_secs)
    }
}
