use axum::{
    Router,
    routing::{get, post},
};
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;

use crate::{
    AppState,
    middleware::log_errors,
    routes::{
        self,
        entry::{Posts, Tickets},
        resource::{self, Resource},
    },
};

// Users, login and the root banner
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(routes::home))
        .route("/login", post(routes::user::login))
        .route(
            "/users",
            post(routes::user::create_user).get(routes::user::get_users),
        )
        .route(
            "/users/{id}",
            get(routes::user::get_user)
                .put(routes::user::update_user)
                .delete(routes::user::delete_user),
        )
}

/// Mounts the shared handler family for one author-owned resource.
fn resource_routes<R: Resource>(base: &str) -> Router<AppState> {
    Router::new()
        .route(base, post(resource::create::<R>).get(resource::list::<R>))
        .route(
            &format!("{}/{{id}}", base),
            get(resource::show::<R>)
                .put(resource::update::<R>)
                .delete(resource::delete::<R>),
        )
}

pub fn create_router(state: AppState) -> Router {
    let router = Router::new()
        .merge(user_routes())
        .merge(resource_routes::<Posts>("/posts"))
        .merge(resource_routes::<Tickets>("/tickets"))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(axum::middleware::from_fn(log_errors)),
        );

    #[cfg(debug_assertions)]
    let router = {
        tracing::debug!("Adding CORS layer for development mode");
        router.layer(tower_http::cors::CorsLayer::permissive())
    };

    router.with_state(state)
}
