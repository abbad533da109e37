use chrono::{DateTime, Utc};
use sqlx::SqlitePool;

use crate::models::User;

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    identifier: &str,
    password_hash: &str,
    created_at: DateTime<Utc>,
) -> Result<User, sqlx::Error> {
    sqlx::query_as::<_, User>(
        "INSERT INTO users (identifier, password_hash, created_at)
         VALUES (?, ?, ?) RETURNING *",
    )
    .bind(identifier)
    .bind(password_hash)
    .bind(created_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_identifier(
    pool: &SqlitePool,
    identifier: &str,
) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>("SELECT * FROM users WHERE identifier = ?")
        .bind(identifier)
        .fetch_optional(pool)
        .await
}

/// Returns the number of rows changed, so callers can detect a missing user.
pub async fn update_password<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: i64,
    password_hash: &str,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE users SET password_hash = ? WHERE id = ?")
        .bind(password_hash)
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
