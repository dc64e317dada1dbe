use axum::Json;
use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

/// Failures of the token service and the request extractor.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthError {
    #[error("no token provided")]
    NoToken,
    #[error("token could not be parsed")]
    Malformed,
    #[error("token signature or algorithm mismatch")]
    InvalidSignature,
    #[error("token has expired")]
    Expired,
    #[error("signing key unavailable: {0}")]
    Config(String),
    #[error("failed to sign token: {0}")]
    Signing(String),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error("author is required")]
    MissingAuthor,
    #[error("identity does not own the resource")]
    Unauthorized,
    #[error("invalid id: {0}")]
    InvalidId(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("validation failed: {0}")]
    Validation(String),
    #[error("invalid body: {0}")]
    InvalidBody(String),
    #[error("{0}")]
    InvalidCredentials(&'static str),
    #[error("storage failure: {0}")]
    Storage(&'static str),
    #[error("password hashing failed: {0}")]
    PasswordHash(#[from] bcrypt::BcryptError),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Auth(AuthError::Config(_) | AuthError::Signing(_)) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            AppError::Auth(_) | AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::MissingAuthor
            | AppError::Validation(_)
            | AppError::InvalidBody(_)
            | AppError::InvalidCredentials(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(_) | AppError::PasswordHash(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Message shown to the client. Internal detail stays in the logs.
    pub fn message(&self) -> String {
        match self {
            AppError::Auth(AuthError::NoToken) => "No token provided".into(),
            AppError::Auth(AuthError::Malformed) => "Malformed token".into(),
            AppError::Auth(AuthError::InvalidSignature) => "Invalid token signature".into(),
            AppError::Auth(AuthError::Expired) => "Token expired".into(),
            AppError::Auth(AuthError::Config(_) | AuthError::Signing(_))
            | AppError::PasswordHash(_) => "Internal server error".into(),
            AppError::MissingAuthor => "Required Author".into(),
            AppError::Unauthorized => "Unauthorized".into(),
            AppError::InvalidId(raw) => format!("Invalid id: {}", raw),
            AppError::NotFound(what) => format!("{} not found", what),
            AppError::Validation(msg) | AppError::InvalidBody(msg) => msg.clone(),
            AppError::InvalidCredentials(msg) | AppError::Storage(msg) => (*msg).to_string(),
        }
    }

    /// Storage failures are logged with the raw driver error where they are
    /// mapped, so the response path does not log them again.
    fn logged_at_source(&self) -> bool {
        matches!(self, AppError::Storage(_))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            if !self.logged_at_source() {
                tracing::error!("request failed: {}", self);
            }
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        let body = Json(ErrorResponse {
            error: self.message(),
        });

        (status, body).into_response()
    }
}

/// Maps a raw storage error onto a sanitized client message, the way unique
/// constraint violations are reported to users.
pub fn format_storage_error(err: &sqlx::Error) -> AppError {
    tracing::error!("storage error: {:?}", err);

    let detail = match err {
        sqlx::Error::Database(db) => db
            .constraint()
            .map(str::to_owned)
            .unwrap_or_else(|| db.message().to_owned()),
        other => other.to_string(),
    };

    AppError::Storage(storage_message(&detail))
}

fn storage_message(detail: &str) -> &'static str {
    if detail.contains("nickname") {
        "Nickname already taken"
    } else if detail.contains("email") {
        "Email already taken"
    } else if detail.contains("title") {
        "Title already taken"
    } else {
        "Incorrect details"
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        format_storage_error(&err)
    }
}
