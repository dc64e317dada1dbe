use std::sync::Arc;

use axum::{
    extract::{FromRef, FromRequestParts, Query},
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::error::{AppError, AuthError};
use crate::utils::{Identity, TokenService};

/// Looks for a token in the `token` query parameter, then in an
/// `Authorization: Bearer <token>` header. Anything else counts as no token.
pub fn extract_token(parts: &Parts) -> Option<String> {
    // a repeated key keeps the first non-empty value
    if let Ok(Query(pairs)) = Query::<Vec<(String, String)>>::try_from_uri(&parts.uri) {
        if let Some((_, token)) = pairs
            .into_iter()
            .find(|(key, value)| key == "token" && !value.is_empty())
        {
            return Some(token);
        }
    }

    let header = parts.headers.get(AUTHORIZATION)?.to_str().ok()?;
    let mut pieces = header.split(' ');
    match (pieces.next(), pieces.next(), pieces.next()) {
        (Some("Bearer"), Some(token), None) if !token.is_empty() => Some(token.to_owned()),
        _ => None,
    }
}

pub fn resolve_identity(parts: &Parts, tokens: &TokenService) -> Result<Identity, AuthError> {
    let token = extract_token(parts).ok_or(AuthError::NoToken)?;
    tokens.verify(&token)
}

/// Identity of the caller, resolved from the request token.
#[derive(Debug, Clone, Copy)]
pub struct Authenticated(pub Identity);

impl<S> FromRequestParts<S> for Authenticated
where
    Arc<TokenService>: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let tokens = Arc::<TokenService>::from_ref(state);
        match resolve_identity(parts, &tokens) {
            Ok(identity) => Ok(Authenticated(identity)),
            Err(e) => {
                tracing::debug!("{} {} rejected: {}", parts.method, parts.uri.path(), e);
                Err(e.into())
            }
        }
    }
}
