use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode, errors::ErrorKind,
};
use serde::{Deserialize, Serialize};

use crate::config::Config;
use crate::error::AuthError;

/// Numeric user identifier carried in the token claims.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Identity(pub i64);

impl Identity {
    /// Zero and negative ids never name a stored user.
    pub fn is_missing(self) -> bool {
        self.0 < 1
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for Identity {
    fn from(id: i64) -> Self {
        Identity(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub authorized: bool,
    pub user_id: i64,
    pub exp: i64,
}

/// Issues and verifies HS256 bearer tokens with a secret injected at
/// construction.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    lifetime: chrono::Duration,
}

impl TokenService {
    pub fn new(secret: &[u8], lifetime: Duration) -> Result<Self, AuthError> {
        if secret.is_empty() {
            return Err(AuthError::Config("signing secret is empty".into()));
        }
        let lifetime = chrono::Duration::from_std(lifetime)
            .map_err(|e| AuthError::Config(format!("token lifetime out of range: {}", e)))?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            lifetime,
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, AuthError> {
        Self::new(config.api_secret.as_bytes(), config.token_expiration())
    }

    pub fn issue(&self, identity: Identity) -> Result<String, AuthError> {
        self.issue_at(identity, Utc::now())
    }

    pub fn issue_at(&self, identity: Identity, issued_at: DateTime<Utc>) -> Result<String, AuthError> {
        let exp = issued_at
            .checked_add_signed(self.lifetime)
            .ok_or_else(|| AuthError::Signing("expiry overflows timestamp range".into()))?
            .timestamp();

        let claims = Claims {
            authorized: true,
            user_id: identity.0,
            exp,
        };

        tracing::debug!("Issuing token for user {} expiring at {}", identity, exp);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::Signing(e.to_string()))
    }

    pub fn verify(&self, token: &str) -> Result<Identity, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        decode::<Claims>(token, &self.decoding_key, &validation)
            .map(|data| Identity(data.claims.user_id))
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => AuthError::Expired,
                ErrorKind::InvalidSignature
                | ErrorKind::InvalidAlgorithm
                | ErrorKind::InvalidAlgorithmName => AuthError::InvalidSignature,
                _ => AuthError::Malformed,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const HOUR: Duration = Duration::from_secs(3600);

    fn service() -> TokenService {
        TokenService::new(b"test-secret", HOUR).unwrap()
    }

    #[test]
    fn issued_token_verifies_to_same_identity() {
        let tokens = service();
        for id in [1, 42, 7_000_000] {
            let token = tokens.issue(Identity(id)).unwrap();
            assert_eq!(tokens.verify(&token).unwrap(), Identity(id));
        }
    }

    #[test]
    fn token_older_than_lifetime_is_expired() {
        let tokens = service();
        let issued_at = Utc::now() - chrono::Duration::hours(2);
        let token = tokens.issue_at(Identity(5), issued_at).unwrap();
        assert_eq!(tokens.verify(&token), Err(AuthError::Expired));
    }

    #[test]
    fn token_just_inside_lifetime_is_valid() {
        let tokens = service();
        let issued_at = Utc::now() - chrono::Duration::minutes(59);
        let token = tokens.issue_at(Identity(5), issued_at).unwrap();
        assert_eq!(tokens.verify(&token), Ok(Identity(5)));
    }

    #[test]
    fn other_secret_fails_signature() {
        let token = service().issue(Identity(9)).unwrap();
        let other = TokenService::new(b"another-secret", HOUR).unwrap();
        assert_eq!(other.verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn other_algorithm_fails_signature() {
        let claims = Claims {
            authorized: true,
            user_id: 3,
            exp: (Utc::now() + chrono::Duration::hours(1)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS512),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(service().verify(&token), Err(AuthError::InvalidSignature));
    }

    #[test]
    fn garbage_is_malformed() {
        assert_eq!(service().verify("This is an incorrect token"), Err(AuthError::Malformed));
        assert_eq!(service().verify("a.b.c"), Err(AuthError::Malformed));
    }

    #[test]
    fn empty_secret_is_config_error() {
        assert!(matches!(TokenService::new(b"", HOUR), Err(AuthError::Config(_))));
    }

    #[test]
    fn from_config_rejects_empty_secret() {
        let mut config = Config {
            database_url: "postgres://localhost/blog".into(),
            api_secret: String::new(),
            token_expiration_secs: 3600,
            server_host: "127.0.0.1".into(),
            server_port: 8080,
            db_max_connections: 1,
            seed_database: true,
        };
        assert!(matches!(TokenService::from_config(&config), Err(AuthError::Config(_))));

        config.api_secret = "configured".into();
        let tokens = TokenService::from_config(&config).unwrap();
        let token = tokens.issue(Identity(2)).unwrap();
        assert_eq!(tokens.verify(&token), Ok(Identity(2)));
    }

    #[test]
    fn claims_carry_authorized_flag() {
        let token = service().issue(Identity(11)).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        let data =
            decode::<Claims>(&token, &DecodingKey::from_secret(b"test-secret"), &validation).unwrap();
        assert!(data.claims.authorized);
        assert_eq!(data.claims.user_id, 11);
        let remaining = data.claims.exp - Utc::now().timestamp();
        assert!((3590..=3600).contains(&remaining));
    }
}
