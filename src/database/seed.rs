use sqlx::PgPool;

use crate::error::AppError;
use crate::routes::entry::{EntryInput, Posts, Tickets};
use crate::routes::resource::Resource;
use crate::routes::user::{User, UserRequest};

const USERS: [(&str, &str); 2] = [
    ("Steven victor", "steven@gmail.com"),
    ("Martin Luther", "luther@gmail.com"),
];

const SEED_PASSWORD: &str = "password";

/// Empties every table and inserts two users, each with one post and one
/// ticket.
pub async fn load(pool: &PgPool) -> Result<(), AppError> {
    sqlx::query("TRUNCATE tickets, posts, users RESTART IDENTITY CASCADE")
        .execute(pool)
        .await?;

    for (i, (nickname, email)) in USERS.iter().enumerate() {
        let user = User::create(
            pool,
            &UserRequest {
                nickname: (*nickname).to_string(),
                email: (*email).to_string(),
                password: SEED_PASSWORD.to_string(),
            },
        )
        .await?;

        let n = i + 1;
        Posts::save(pool, entry(format!("Title {}", n), format!("Hello world {}", n), user.id)).await?;
        Tickets::save(pool, entry(format!("Ticket {}", n), format!("Ticket body {}", n), user.id))
            .await?;
    }

    tracing::info!("Seeded {} users with posts and tickets", USERS.len());
    Ok(())
}

fn entry(title: String, content: String, author_id: i64) -> EntryInput {
    EntryInput {
        title,
        content,
        author_id,
    }
}
