use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::AppError;
use crate::routes::resource::Resource;
use crate::routes::user::User;
use crate::utils::{Identity, prepare_text};

const MAX_FIELD_LEN: usize = 255;

/// Row shared by posts and tickets.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Entry {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub author_id: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[sqlx(skip)]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub author: Option<User>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct EntryInput {
    pub title: String,
    pub content: String,
    pub author_id: i64,
}

impl EntryInput {
    pub fn prepare(&mut self) {
        self.title = prepare_text(&self.title);
        self.content = prepare_text(&self.content);
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.title.is_empty() {
            return Err(AppError::Validation("Required Title".into()));
        }
        if self.title.chars().count() > MAX_FIELD_LEN {
            return Err(AppError::Validation("Title too long".into()));
        }
        if self.content.is_empty() {
            return Err(AppError::Validation("Required Content".into()));
        }
        if self.content.chars().count() > MAX_FIELD_LEN {
            return Err(AppError::Validation("Content too long".into()));
        }
        if Identity(self.author_id).is_missing() {
            return Err(AppError::MissingAuthor);
        }
        Ok(())
    }
}

/// A table of author-owned entries. Implementors get the full `Resource`
/// capability set.
pub trait EntryTable: Send + Sync + 'static {
    const TABLE: &'static str;
    const LABEL: &'static str;
}

pub struct Posts;

impl EntryTable for Posts {
    const TABLE: &'static str = "posts";
    const LABEL: &'static str = "Post";
}

pub struct Tickets;

impl EntryTable for Tickets {
    const TABLE: &'static str = "tickets";
    const LABEL: &'static str = "Ticket";
}

const COLUMNS: &str = "id, title, content, author_id, created_at, updated_at";

async fn attach_authors(pool: &PgPool, entries: &mut [Entry]) -> Result<(), sqlx::Error> {
    let mut ids: Vec<i64> = entries.iter().map(|e| e.author_id).collect();
    ids.sort_unstable();
    ids.dedup();
    if ids.is_empty() {
        return Ok(());
    }

    let authors: HashMap<i64, User> = User::find_by_ids(pool, &ids)
        .await?
        .into_iter()
        .map(|u| (u.id, u))
        .collect();

    for entry in entries.iter_mut() {
        entry.author = authors.get(&entry.author_id).cloned();
    }
    Ok(())
}

async fn with_author(pool: &PgPool, entry: Entry) -> Result<Entry, sqlx::Error> {
    let mut one = [entry];
    attach_authors(pool, &mut one).await?;
    let [entry] = one;
    Ok(entry)
}

#[async_trait]
impl<T: EntryTable> Resource for T {
    const LABEL: &'static str = <T as EntryTable>::LABEL;

    type Record = Entry;
    type Input = EntryInput;

    fn id(record: &Entry) -> i64 {
        record.id
    }

    fn owner(record: &Entry) -> Identity {
        Identity(record.author_id)
    }

    fn claimed_author(input: &EntryInput) -> Identity {
        Identity(input.author_id)
    }

    fn validate(input: &mut EntryInput) -> Result<(), AppError> {
        input.prepare();
        input.validate()
    }

    async fn save(pool: &PgPool, input: EntryInput) -> Result<Entry, sqlx::Error> {
        let sql = format!(
            "INSERT INTO {} (title, content, author_id) VALUES ($1, $2, $3) RETURNING {}",
            T::TABLE,
            COLUMNS
        );
        let entry = sqlx::query_as::<_, Entry>(&sql)
            .bind(input.title)
            .bind(input.content)
            .bind(input.author_id)
            .fetch_one(pool)
            .await?;

        with_author(pool, entry).await
    }

    async fn find_all(pool: &PgPool) -> Result<Vec<Entry>, sqlx::Error> {
        let sql = format!("SELECT {} FROM {} ORDER BY id LIMIT 100", COLUMNS, T::TABLE);
        let mut entries = sqlx::query_as::<_, Entry>(&sql).fetch_all(pool).await?;

        attach_authors(pool, &mut entries).await?;
        Ok(entries)
    }

    async fn find(pool: &PgPool, id: i64) -> Result<Option<Entry>, sqlx::Error> {
        let sql = format!("SELECT {} FROM {} WHERE id = $1", COLUMNS, T::TABLE);
        let entry = sqlx::query_as::<_, Entry>(&sql)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match entry {
            Some(entry) => Ok(Some(with_author(pool, entry).await?)),
            None => Ok(None),
        }
    }

    async fn update(pool: &PgPool, id: i64, input: EntryInput) -> Result<Option<Entry>, sqlx::Error> {
        let sql = format!(
            "UPDATE {} SET title = $1, content = $2, updated_at = NOW() WHERE id = $3 RETURNING {}",
            T::TABLE,
            COLUMNS
        );
        let entry = sqlx::query_as::<_, Entry>(&sql)
            .bind(input.title)
            .bind(input.content)
            .bind(id)
            .fetch_optional(pool)
            .await?;

        match entry {
            Some(entry) => Ok(Some(with_author(pool, entry).await?)),
            None => Ok(None),
        }
    }

    async fn delete(pool: &PgPool, id: i64, owner: Identity) -> Result<u64, sqlx::Error> {
        let sql = format!("DELETE FROM {} WHERE id = $1 AND author_id = $2", T::TABLE);
        let result = sqlx::query(&sql)
            .bind(id)
            .bind(owner.0)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(title: &str, content: &str, author_id: i64) -> EntryInput {
        EntryInput {
            title: title.into(),
            content: content.into(),
            author_id,
        }
    }

    fn message(mut input: EntryInput) -> Option<String> {
        <Posts as Resource>::validate(&mut input).err().map(|e| e.message())
    }

    #[test]
    fn validation_messages_in_field_order() {
        assert_eq!(message(input("", "the content", 1)).as_deref(), Some("Required Title"));
        assert_eq!(message(input("The title", "", 1)).as_deref(), Some("Required Content"));
        assert_eq!(message(input("The title", "the content", 0)).as_deref(), Some("Required Author"));
        assert_eq!(message(input("The title", "the content", 1)), None);
    }

    #[test]
    fn whitespace_only_title_is_missing() {
        assert_eq!(message(input("   ", "the content", 1)).as_deref(), Some("Required Title"));
    }

    #[test]
    fn overlong_fields_are_rejected() {
        let long = "x".repeat(256);
        assert_eq!(message(input(&long, "c", 1)).as_deref(), Some("Title too long"));
        assert_eq!(message(input("t", &long, 1)).as_deref(), Some("Content too long"));
    }

    #[test]
    fn ownership_comes_from_author_id() {
        let entry = Entry {
            id: 3,
            title: "Title 1".into(),
            content: "Hello world 1".into(),
            author_id: 8,
            created_at: Utc::now(),
            updated_at: Utc::now(),
            author: None,
        };
        assert_eq!(<Tickets as Resource>::owner(&entry), Identity(8));
        assert_eq!(<Tickets as Resource>::id(&entry), 3);
        assert_eq!(<Posts as Resource>::LABEL, "Post");
        assert_eq!(<Tickets as Resource>::LABEL, "Ticket");
    }

    #[test]
    fn missing_author_field_deserializes_as_zero() {
        let parsed: EntryInput =
            serde_json::from_str(r#"{"title": "This is an awesome title", "content": "the content"}"#)
                .unwrap();
        assert!(<Posts as Resource>::claimed_author(&parsed).is_missing());
    }
}
