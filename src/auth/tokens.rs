use chrono::{DateTime, Duration, Utc};
use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use crate::auth::AuthError;
use crate::db;

/// How long a reset link stays valid, matching the "expires in 1 hour"
/// wording in the reset email.
const RESET_TOKEN_MINUTES: i64 = 60;

/// A freshly issued token. `token` is the only copy of the plaintext; the
/// database holds its hash.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub user_id: i64,
    pub expires_at: DateTime<Utc>,
}

/// Issues and consumes single-use password-reset tokens. Issuance appends to
/// the `reset_tokens` log; older tokens for the same user become logically
/// invalid because validation only accepts the most recently issued one.
#[derive(Clone)]
pub struct TokenIssuer {
    pool: SqlitePool,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            ttl: Duration::minutes(RESET_TOKEN_MINUTES),
        }
    }

    /// Override the expiry window. Used by tests to exercise expiration.
    pub fn with_ttl(pool: SqlitePool, ttl: Duration) -> Self {
        Self { pool, ttl }
    }

    /// Generate a 256-bit random token for the user and persist its hash.
    pub async fn issue(&self, user_id: i64) -> Result<IssuedToken, AuthError> {
        let token = generate_token();
        let now = Utc::now();
        let expires_at = now + self.ttl;

        db::reset_tokens::create(&self.pool, user_id, &hash_token(&token), now, expires_at)
            .await?;

        Ok(IssuedToken {
            token,
            user_id,
            expires_at,
        })
    }

    /// Validate a token and mark it consumed in one indivisible step.
    pub async fn validate_and_consume(&self, token: &str) -> Result<i64, AuthError> {
        let mut tx = self.pool.begin().await?;
        let user_id = self.consume_in_tx(&mut tx, token).await?;
        tx.commit().await?;
        Ok(user_id)
    }

    /// Validate and consume inside the caller's transaction, so consumption
    /// and a follow-on write (the password update) commit or roll back
    /// together.
    ///
    /// Classification order: unknown hash, then already-consumed, then
    /// expired, then superseded. A superseded token is any row older than the
    /// most recently issued one for the user, whatever its consumed state;
    /// it is reported as `NotFound` so a stale link carries no signal. The
    /// final conditional UPDATE runs inside the same transaction as the
    /// checks, so two concurrent resets with the same token cannot both pass.
    pub async fn consume_in_tx(
        &self,
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        token: &str,
    ) -> Result<i64, AuthError> {
        let token_hash = hash_token(token);

        let Some(stored) = db::reset_tokens::find_by_hash(&mut **tx, &token_hash).await? else {
            return Err(AuthError::NotFound);
        };

        if stored.consumed {
            return Err(AuthError::TokenConsumed);
        }

        if stored.expires_at < Utc::now() {
            return Err(AuthError::TokenExpired);
        }

        let newest = db::reset_tokens::latest_id(&mut **tx, stored.user_id).await?;
        if newest != Some(stored.id) {
            return Err(AuthError::NotFound);
        }

        let changed = db::reset_tokens::mark_consumed(&mut **tx, stored.id).await?;
        if changed == 0 {
            return Err(AuthError::TokenConsumed);
        }

        Ok(stored.user_id)
    }
}

fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    hex::encode(bytes)
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(token.as_bytes());
    format!("{:x}", hasher.finalize())
}
