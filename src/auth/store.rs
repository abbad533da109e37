use chrono::Utc;
use sqlx::SqlitePool;

use crate::auth::{normalize_identifier, password, AuthError};
use crate::db;
use crate::models::User;

/// Credential storage over the local SQLite database. One instance is
/// constructed at startup and shared for the life of the process.
#[derive(Clone)]
pub struct CredentialStore {
    pool: SqlitePool,
}

impl CredentialStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Create a user with a salted Argon2id hash of the password.
    ///
    /// Uniqueness is enforced by the UNIQUE constraint on `users.identifier`,
    /// not by a prior existence check, so two concurrent signups with the
    /// same identifier cannot both succeed.
    pub async fn create_user(&self, identifier: &str, password: &str) -> Result<User, AuthError> {
        let identifier = normalize_identifier(identifier);
        let password_hash =
            password::hash(password).map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))?;

        match db::users::create(&self.pool, &identifier, &password_hash, Utc::now()).await {
            Ok(user) => Ok(user),
            Err(sqlx::Error::Database(db_err)) if db_err.is_unique_violation() => {
                Err(AuthError::DuplicateIdentifier)
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Look up by normalized identifier and check the password. Unknown
    /// identifier and wrong password both return `InvalidCredentials`.
    pub async fn verify_credentials(
        &self,
        identifier: &str,
        password_attempt: &str,
    ) -> Result<User, AuthError> {
        let identifier = normalize_identifier(identifier);

        let Some(user) = db::users::find_by_identifier(&self.pool, &identifier).await? else {
            return Err(AuthError::InvalidCredentials);
        };

        let valid = password::verify(password_attempt, &user.password_hash)
            .map_err(|e| AuthError::Internal(format!("Stored hash unreadable: {e}")))?;
        if !valid {
            return Err(AuthError::InvalidCredentials);
        }

        Ok(user)
    }

    pub async fn find_user(&self, identifier: &str) -> Result<Option<User>, AuthError> {
        let identifier = normalize_identifier(identifier);
        Ok(db::users::find_by_identifier(&self.pool, &identifier).await?)
    }

    /// Replace the stored hash. Does not require the old password; the caller
    /// must have consumed a valid reset token first, and passes its open
    /// transaction so the consume and the update commit together.
    pub async fn update_password<'e, E: sqlx::SqliteExecutor<'e>>(
        &self,
        executor: E,
        user_id: i64,
        new_password: &str,
    ) -> Result<(), AuthError> {
        let password_hash = password::hash(new_password)
            .map_err(|e| AuthError::Internal(format!("Password hashing failed: {e}")))?;

        let changed = db::users::update_password(executor, user_id, &password_hash).await?;
        if changed == 0 {
            return Err(AuthError::NotFound);
        }
        Ok(())
    }
}
