//! One handler family shared by every author-owned resource.

use async_trait::async_trait;
use serde::{Serialize, de::DeserializeOwned};
use sqlx::PgPool;

use crate::error::AppError;
use crate::utils::Identity;

mod handler;

pub use handler::{create, delete, list, show, update};

/// Capabilities a resource needs to be served by the shared handlers.
#[async_trait]
pub trait Resource: Send + Sync + 'static {
    /// Singular name used in messages, e.g. "Post".
    const LABEL: &'static str;

    type Record: Serialize + Send;
    type Input: DeserializeOwned + Send;

    fn id(record: &Self::Record) -> i64;
    fn owner(record: &Self::Record) -> Identity;
    fn claimed_author(input: &Self::Input) -> Identity;

    /// Normalizes the input in place and checks it.
    fn validate(input: &mut Self::Input) -> Result<(), AppError>;

    async fn save(pool: &PgPool, input: Self::Input) -> Result<Self::Record, sqlx::Error>;
    async fn find_all(pool: &PgPool) -> Result<Vec<Self::Record>, sqlx::Error>;
    async fn find(pool: &PgPool, id: i64) -> Result<Option<Self::Record>, sqlx::Error>;
    async fn update(
        pool: &PgPool,
        id: i64,
        input: Self::Input,
    ) -> Result<Option<Self::Record>, sqlx::Error>;
    /// Deletes the row only if it is still owned by `owner`.
    async fn delete(pool: &PgPool, id: i64, owner: Identity) -> Result<u64, sqlx::Error>;
}
