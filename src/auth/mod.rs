pub mod extractor;
pub mod flow;
pub mod jwt;
pub mod password;
pub mod store;
pub mod tokens;

/// Classified auth failures. Every operation on the store, issuer, and flow
/// controller reports failure as one of these; nothing in this module panics
/// across the component boundary.
#[derive(Debug)]
pub enum AuthError {
    /// A user with the normalized identifier already exists.
    DuplicateIdentifier,
    /// Unknown identifier or wrong password. Deliberately a single variant so
    /// callers cannot distinguish the two (anti-enumeration).
    InvalidCredentials,
    /// User or reset token not found. Also covers superseded tokens.
    NotFound,
    TokenExpired,
    TokenConsumed,
    /// Password policy or confirmation mismatch, with a display reason.
    Validation(String),
    /// Hashing or other internal fault. Never shown to callers verbatim.
    Internal(String),
    /// Storage fault. Fatal for the current request only; details are logged,
    /// callers see a generic service-unavailable classification.
    Storage(sqlx::Error),
}

impl std::fmt::Display for AuthError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthError::DuplicateIdentifier => {
                write!(f, "An account with that identifier already exists")
            }
            AuthError::InvalidCredentials => write!(f, "Invalid identifier or password"),
            AuthError::NotFound => write!(f, "Invalid reset token"),
            AuthError::TokenExpired => write!(f, "Reset token has expired"),
            AuthError::TokenConsumed => write!(f, "Reset token has already been used"),
            AuthError::Validation(reason) => write!(f, "{reason}"),
            AuthError::Internal(reason) => write!(f, "Internal error: {reason}"),
            AuthError::Storage(err) => write!(f, "Storage error: {err}"),
        }
    }
}

impl From<sqlx::Error> for AuthError {
    fn from(err: sqlx::Error) -> Self {
        AuthError::Storage(err)
    }
}

/// Case-fold an identifier for storage and comparison.
pub fn normalize_identifier(identifier: &str) -> String {
    identifier.trim().to_lowercase()
}
