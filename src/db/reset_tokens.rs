use chrono::{DateTime, Utc};

use crate::models::ResetToken;

pub async fn create<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    user_id: i64,
    token_hash: &str,
    issued_at: DateTime<Utc>,
    expires_at: DateTime<Utc>,
) -> Result<ResetToken, sqlx::Error> {
    sqlx::query_as::<_, ResetToken>(
        "INSERT INTO reset_tokens (user_id, token_hash, issued_at, expires_at)
         VALUES (?, ?, ?, ?) RETURNING *",
    )
    .bind(user_id)
    .bind(token_hash)
    .bind(issued_at)
    .bind(expires_at)
    .fetch_one(executor)
    .await
}

pub async fn find_by_hash<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    token_hash: &str,
) -> Result<Option<ResetToken>, sqlx::Error> {
    sqlx::query_as::<_, ResetToken>("SELECT * FROM reset_tokens WHERE token_hash = ?")
        .bind(token_hash)
        .fetch_optional(executor)
        .await
}

/// Id of the most recently issued token for a user, consumed or not. Only
/// this token may validate; filtering on `consumed` here would let an older
/// token come back to life once the newer one is spent.
pub async fn latest_id<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    user_id: i64,
) -> Result<Option<i64>, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM reset_tokens WHERE user_id = ? ORDER BY id DESC LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(executor)
    .await?;
    Ok(row.map(|(id,)| id))
}

/// Conditional mark-consumed. Returns the number of rows changed: 0 means the
/// token was already consumed by a concurrent request.
pub async fn mark_consumed<'e, E: sqlx::SqliteExecutor<'e>>(
    executor: E,
    id: i64,
) -> Result<u64, sqlx::Error> {
    let result = sqlx::query("UPDATE reset_tokens SET consumed = 1 WHERE id = ? AND consumed = 0")
        .bind(id)
        .execute(executor)
        .await?;
    Ok(result.rows_affected())
}
