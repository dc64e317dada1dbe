use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::utils::{hash_password, is_valid_email, prepare_text, verify_password};

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub nickname: String,
    pub email: String,
    #[serde(skip_serializing, default)]
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub active: bool,
}

/// Body of create, update and login requests. Missing fields deserialize as
/// empty so they are reported by validation rather than by the JSON parser.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct UserRequest {
    pub nickname: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserAction {
    Create,
    Update,
    Login,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub user_id: i64,
    pub token: String,
}

impl UserRequest {
    pub fn prepare(&mut self) {
        self.nickname = prepare_text(&self.nickname);
        self.email = prepare_text(&self.email);
    }

    pub fn validate(&self, action: UserAction) -> Result<(), AppError> {
        let mut problems = Vec::new();

        if action != UserAction::Login {
            if self.nickname.is_empty() {
                problems.push("Required Nickname");
            } else if self.nickname.chars().count() > 255 {
                problems.push("Nickname too long");
            }
        }
        if self.password.is_empty() {
            problems.push("Required Password");
        }
        if self.email.is_empty() {
            problems.push("Required Email");
        } else if !is_valid_email(&self.email) || self.email.chars().count() > 100 {
            problems.push("Invalid Email");
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(problems.join(", ")))
        }
    }
}

impl User {
    pub async fn create(pool: &PgPool, req: &UserRequest) -> Result<Self, AppError> {
        let password = hash_password(&req.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            INSERT INTO users (nickname, email, password)
            VALUES ($1, $2, $3)
            RETURNING id, nickname, email, password, created_at, updated_at, active
            "#,
        )
        .bind(&req.nickname)
        .bind(&req.email)
        .bind(password)
        .fetch_one(pool)
        .await?;

        tracing::info!("Created user {}", user.id);
        Ok(user)
    }

    pub async fn find_all(pool: &PgPool) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, nickname, email, password, created_at, updated_at, active
            FROM users
            ORDER BY id
            LIMIT 100
            "#,
        )
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_id(pool: &PgPool, id: i64) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, nickname, email, password, created_at, updated_at, active
            FROM users
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(pool)
        .await
    }

    pub async fn find_by_ids(pool: &PgPool, ids: &[i64]) -> Result<Vec<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, nickname, email, password, created_at, updated_at, active
            FROM users
            WHERE id = ANY($1)
            "#,
        )
        .bind(ids)
        .fetch_all(pool)
        .await
    }

    pub async fn find_by_email(pool: &PgPool, email: &str) -> Result<Option<Self>, sqlx::Error> {
        sqlx::query_as::<_, User>(
            r#"
            SELECT id, nickname, email, password, created_at, updated_at, active
            FROM users
            WHERE email = $1
            "#,
        )
        .bind(email)
        .fetch_optional(pool)
        .await
    }

    pub async fn update(
        pool: &PgPool,
        id: i64,
        req: &UserRequest,
    ) -> Result<Option<Self>, AppError> {
        let password = hash_password(&req.password)?;

        let user = sqlx::query_as::<_, User>(
            r#"
            UPDATE users
            SET nickname = $1, email = $2, password = $3, updated_at = NOW()
            WHERE id = $4
            RETURNING id, nickname, email, password, created_at, updated_at, active
            "#,
        )
        .bind(&req.nickname)
        .bind(&req.email)
        .bind(password)
        .bind(id)
        .fetch_optional(pool)
        .await?;

        Ok(user)
    }

    pub async fn delete(pool: &PgPool, id: i64) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub fn verify_login(&self, password: &str) -> Result<bool, bcrypt::BcryptError> {
        verify_password(password, &self.password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(nickname: &str, email: &str, password: &str) -> UserRequest {
        UserRequest {
            nickname: nickname.into(),
            email: email.into(),
            password: password.into(),
        }
    }

    #[test]
    fn create_requires_every_field() {
        let err = request("", "", "").validate(UserAction::Create).unwrap_err();
        assert_eq!(
            err.message(),
            "Required Nickname, Required Password, Required Email"
        );
    }

    #[test]
    fn login_ignores_nickname() {
        assert!(request("", "luther@gmail.com", "password")
            .validate(UserAction::Login)
            .is_ok());
    }

    #[test]
    fn email_format_is_checked() {
        let err = request("Martin", "luther", "password")
            .validate(UserAction::Update)
            .unwrap_err();
        assert_eq!(err.message(), "Invalid Email");
    }

    #[test]
    fn prepare_escapes_but_keeps_password() {
        let mut req = request("  <Steven>  ", " steven@gmail.com ", " secret ");
        req.prepare();
        assert_eq!(req.nickname, "&lt;Steven&gt;");
        assert_eq!(req.email, "steven@gmail.com");
        assert_eq!(req.password, " secret ");
    }

    #[test]
    fn password_hash_is_not_serialized() {
        let user = User {
            id: 1,
            nickname: "Steven victor".into(),
            email: "steven@gmail.com".into(),
            password: "$2b$12$hash".into(),
            created_at: Utc::now(),
            updated_at: Utc::now(),
            active: true,
        };
        let json = serde_json::to_value(&user).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["nickname"], "Steven victor");
    }
}
