use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One row in the append-only issuance log. Only the SHA-256 hash of the
/// token is stored; the plaintext token leaves the process exactly once,
/// inside the reset link.
#[derive(Debug, Clone, sqlx::FromRow, Serialize, Deserialize)]
pub struct ResetToken {
    pub id: i64,
    pub user_id: i64,
    pub token_hash: String,
    pub consumed: bool,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}
