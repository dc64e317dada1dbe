use axum::extract::{FromRequest, FromRequestParts, Path, rejection::JsonRejection};
use axum::http::request::Parts;

use crate::error::AppError;

/// Numeric `{id}` path segment. Anything that is not a non-negative integer
/// is rejected with 400 before authentication runs.
#[derive(Debug, Clone, Copy)]
pub struct ResourceId(pub i64);

impl<S> FromRequestParts<S> for ResourceId
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Path(raw) = Path::<String>::from_request_parts(parts, state)
            .await
            .map_err(|e| AppError::InvalidId(e.body_text()))?;

        raw.parse::<i64>()
            .ok()
            .filter(|id| *id >= 0)
            .map(ResourceId)
            .ok_or(AppError::InvalidId(raw))
    }
}

/// JSON body whose rejection uses the `{"error": ...}` envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct JsonBody<T>(pub T);

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidBody(rejection.body_text())
    }
}
