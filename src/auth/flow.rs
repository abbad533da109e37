use sqlx::SqlitePool;

use chrono::{DateTime, Utc};

use crate::auth::store::CredentialStore;
use crate::auth::tokens::TokenIssuer;
use crate::auth::AuthError;
use crate::models::User;

/// Minimum password length, enforced at signup and reset.
pub const MIN_PASSWORD_LEN: usize = 8;

#[derive(Debug, Clone)]
pub struct SignupInput {
    pub identifier: String,
    pub password: String,
    pub confirm: String,
}

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub identifier: String,
    pub password: String,
}

#[derive(Debug, Clone)]
pub struct ForgotInput {
    pub identifier: String,
}

#[derive(Debug, Clone)]
pub struct ResetInput {
    pub token: String,
    pub new_password: String,
}

/// Outcome of a successful forgot-password lookup: who to notify and the
/// plaintext token to embed in the reset link.
#[derive(Debug, Clone)]
pub struct ResetIssued {
    pub identifier: String,
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

/// Orchestrates signup, login, forgot-password, and reset-password against
/// the credential store and token issuer. Each call is a single atomic
/// attempt; nothing is retried and every failure comes back as an
/// `AuthError`. Constructed once at startup around the shared pool.
#[derive(Clone)]
pub struct AuthFlow {
    pool: SqlitePool,
    store: CredentialStore,
    issuer: TokenIssuer,
}

impl AuthFlow {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            store: CredentialStore::new(pool.clone()),
            issuer: TokenIssuer::new(pool.clone()),
            pool,
        }
    }

    pub async fn signup(&self, input: SignupInput) -> Result<User, AuthError> {
        if input.identifier.trim().is_empty() {
            return Err(AuthError::Validation(
                "Identifier must not be empty".to_string(),
            ));
        }
        check_password_policy(&input.password)?;
        if input.password != input.confirm {
            return Err(AuthError::Validation(
                "Password confirmation does not match".to_string(),
            ));
        }

        self.store
            .create_user(&input.identifier, &input.password)
            .await
    }

    pub async fn login(&self, input: LoginInput) -> Result<User, AuthError> {
        if input.identifier.trim().is_empty() || input.password.is_empty() {
            return Err(AuthError::InvalidCredentials);
        }

        self.store
            .verify_credentials(&input.identifier, &input.password)
            .await
    }

    /// Issue a reset token if the identifier maps to a user. Returns `None`
    /// for unknown identifiers; the caller must render the same
    /// acknowledgement either way so the response carries no enumeration
    /// signal. The token itself goes out of band (email or log), never in
    /// the HTTP response.
    pub async fn forgot_password(
        &self,
        input: ForgotInput,
    ) -> Result<Option<ResetIssued>, AuthError> {
        let Some(user) = self.store.find_user(&input.identifier).await? else {
            return Ok(None);
        };

        let issued = self.issuer.issue(user.id).await?;
        Ok(Some(ResetIssued {
            identifier: user.identifier,
            token: issued.token,
            expires_at: issued.expires_at,
        }))
    }

    /// Consume the token and replace the password in one transaction: a
    /// fault in the update rolls the consumption back, so the link is not
    /// burned without the password changing.
    pub async fn reset_password(&self, input: ResetInput) -> Result<(), AuthError> {
        check_password_policy(&input.new_password)?;

        let mut tx = self.pool.begin().await?;
        let user_id = self.issuer.consume_in_tx(&mut tx, &input.token).await?;
        self.store
            .update_password(&mut *tx, user_id, &input.new_password)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

fn check_password_policy(password: &str) -> Result<(), AuthError> {
    if password.len() < MIN_PASSWORD_LEN {
        return Err(AuthError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LEN} characters"
        )));
    }
    Ok(())
}
