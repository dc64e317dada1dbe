pub mod entry;
pub mod resource;
pub mod user;

use axum::Json;

/// API version banner served at the root.
pub async fn home() -> Json<&'static str> {
    Json("v0")
}
