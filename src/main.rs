use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

use blog_backend::{
    AppState, config::Config, database, router::create_router, utils::TokenService,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Config::from_env().expect("Failed to load configuration");
    let tokens = TokenService::from_config(&config).expect("Failed to build token service");

    #[cfg(debug_assertions)]
    tracing::info!("Running in debug mode with CORS enabled");

    #[cfg(not(debug_assertions))]
    tracing::info!("Running in production mode with CORS disabled");

    let pool = database::connect(&config)
        .await
        .expect("Failed to connect to Postgres");

    database::migrate(&pool)
        .await
        .expect("Failed to migrate database");

    if config.seed_database {
        database::seed(&pool).await.expect("Failed to seed database");
    }

    let state = AppState {
        pool,
        config,
        tokens: Arc::new(tokens),
    };

    let app = create_router(state.clone());

    let addr = SocketAddr::new(
        state.config.server_host.parse().unwrap_or_else(|_| {
            tracing::warn!("Invalid server_host, falling back to dual-stack default");
            IpAddr::V6(std::net::Ipv6Addr::UNSPECIFIED)
        }),
        state.config.server_port,
    );
    tracing::info!("Server listening on {}", addr);
    axum::serve(
        tokio::net::TcpListener::bind(&addr)
            .await
            .expect("Failed to bind"),
        app.into_make_service_with_connect_info::<SocketAddr>(),
    )
    .await
    .expect("Failed to start server");
}
